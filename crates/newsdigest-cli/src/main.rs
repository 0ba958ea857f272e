use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use newsdigest_core::AppConfig;

mod commands;
mod server;

#[derive(Parser)]
#[command(name = "newsdigest")]
#[command(author, version, about = "Stream AI summaries of news articles")]
struct Cli {
    /// Path to the config file (default: ~/.config/newsdigest/config.toml)
    #[arg(long, global = true, env = "NEWSDIGEST_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize articles for a news API URL or a set of parameters
    Summarize {
        /// Full news API URL, e.g. https://newsapi.org/v2/everything?q=rust
        #[arg(long, conflicts_with_all = ["params", "endpoint"])]
        url: Option<String>,
        /// Query parameter as KEY=VALUE (repeatable)
        #[arg(short = 'p', long = "param", value_parser = commands::summarize::parse_key_val)]
        params: Vec<(String, String)>,
        /// Endpoint name: everything, top-headlines or sources
        #[arg(short = 'e', long)]
        endpoint: Option<String>,
        /// Number of articles to summarize
        #[arg(short = 'n', long = "max-articles")]
        max_articles: Option<u32>,
    },
    /// Summarize top headlines for a category
    Headlines {
        /// technology, business, ai, india, or any news API category
        #[arg(short = 'c', long)]
        category: Option<String>,
        /// Two-letter country code
        #[arg(long)]
        country: Option<String>,
        /// Number of articles to summarize
        #[arg(short = 'n', long = "max-articles")]
        max_articles: Option<u32>,
    },
    /// Run the HTTP server
    Serve {
        /// Address to bind, e.g. 127.0.0.1:8000
        #[arg(short = 'b', long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match cli.config {
        Some(ref path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    // Initialize logging on stderr so stdout carries only events
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = Arc::new(config);

    match cli.command {
        Commands::Summarize {
            url,
            params,
            endpoint,
            max_articles,
        } => {
            let raw = commands::summarize::build_query(url, params, endpoint)?;
            commands::summarize::run(&config, raw, max_articles).await
        }
        Commands::Headlines {
            category,
            country,
            max_articles,
        } => {
            commands::headlines::run(&config, category.as_deref(), country.as_deref(), max_articles).await
        }
        Commands::Serve { bind } => commands::serve::run(config, bind).await,
    }
}
