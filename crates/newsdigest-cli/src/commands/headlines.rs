use anyhow::Result;

use newsdigest_core::news::Category;
use newsdigest_core::{AppConfig, SummaryPipeline};

pub async fn run(
    config: &AppConfig,
    category: Option<&str>,
    country: Option<&str>,
    max_articles: Option<u32>,
) -> Result<()> {
    let category = Category::parse(category.unwrap_or_default());
    let max_articles = max_articles.unwrap_or(config.news.default_max_articles);
    tracing::info!("Fetching {} headlines", category);

    let pipeline = SummaryPipeline::from_config(config)?;
    let stream = pipeline
        .stream_summaries(category.to_query(country), max_articles)
        .await?;

    super::print_events(stream).await
}
