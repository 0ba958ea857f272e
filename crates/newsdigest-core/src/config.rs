use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const NEWS_API_KEY_ENV: &str = "NEWS_API_KEY";
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub news: NewsApiConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsApiConfig {
    /// Base URL of the article API; the endpoint name is appended to it
    #[serde(default = "default_news_base_url")]
    pub base_url: String,
    /// Article API key (env NEWS_API_KEY overrides)
    #[serde(default)]
    pub api_key: Option<String>,
    /// Batch size used when the caller does not give one
    #[serde(default = "default_max_articles")]
    pub default_max_articles: u32,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// HTTP proxy URL (e.g., "http://127.0.0.1:7890" or "socks5://127.0.0.1:1080")
    #[serde(default)]
    pub proxy_url: Option<String>,
}

impl Default for NewsApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_news_base_url(),
            api_key: None,
            default_max_articles: default_max_articles(),
            request_timeout_secs: default_timeout(),
            proxy_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// AI provider: "openai", "claude_api"
    #[serde(default = "default_ai_provider")]
    pub provider: String,
    /// OpenAI API key (env OPENAI_API_KEY overrides)
    #[serde(default)]
    pub openai_api_key: Option<String>,
    /// OpenAI model name
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    /// Alternative OpenAI-compatible API base
    #[serde(default)]
    pub openai_api_base: Option<String>,
    /// Claude/Anthropic API key (env ANTHROPIC_API_KEY overrides)
    #[serde(default)]
    pub claude_api_key: Option<String>,
    /// Claude model name
    #[serde(default = "default_claude_model")]
    pub claude_model: String,
    /// Anthropic API base
    #[serde(default = "default_claude_api_base")]
    pub claude_api_base: String,
    /// Max tokens for summary
    #[serde(default = "default_max_tokens")]
    pub max_summary_tokens: u32,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Model calls in flight per request (1 = strictly sequential)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Model request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: default_ai_provider(),
            openai_api_key: None,
            openai_model: default_openai_model(),
            openai_api_base: None,
            claude_api_key: None,
            claude_model: default_claude_model(),
            claude_api_base: default_claude_api_base(),
            max_summary_tokens: default_max_tokens(),
            temperature: default_temperature(),
            concurrency: default_concurrency(),
            request_timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Allowed CORS origins ("*" allows any)
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_origins: default_cors_origins(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_news_base_url() -> String {
    "https://newsapi.org/v2".to_string()
}

fn default_max_articles() -> u32 {
    5
}

fn default_timeout() -> u64 {
    30
}

fn default_ai_provider() -> String {
    "openai".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_claude_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_claude_api_base() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_max_tokens() -> u32 {
    200
}

fn default_temperature() -> f32 {
    0.1
}

fn default_concurrency() -> usize {
    1
}

fn default_bind_address() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from the default path, then apply environment overrides
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path` (missing file means defaults),
    /// then apply environment overrides
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        let path = expand_tilde(path);

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            Self::from_toml(&content)?
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Credentials from the environment take precedence over the file
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(NEWS_API_KEY_ENV) {
            self.news.api_key = Some(key);
        }
        if let Some(key) = non_empty(OPENAI_API_KEY_ENV) {
            self.ai.openai_api_key = Some(key);
        }
        if let Some(key) = non_empty(ANTHROPIC_API_KEY_ENV) {
            self.ai.claude_api_key = Some(key);
        }
    }

    /// Get the configuration file path
    /// Always uses ~/.config/newsdigest/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("newsdigest")
            .join("config.toml")
    }
}
