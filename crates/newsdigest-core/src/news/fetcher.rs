use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Proxy};

use super::models::{ApiErrorBody, ArticleRecord, ArticlesResponse};
use super::query::NormalizedRequest;
use crate::config::AppConfig;
use crate::{Error, Result};

const USER_AGENT: &str = concat!("newsdigest/", env!("CARGO_PKG_VERSION"));
const UNKNOWN_UPSTREAM_ERROR: &str = "Unknown error";

/// Anything that can produce a batch of articles for a normalized request
#[async_trait::async_trait]
pub trait ArticleSource: Send + Sync {
    /// Fetch up to `max_articles` articles, preserving upstream order
    async fn fetch(&self, request: &NormalizedRequest, max_articles: u32) -> Result<Vec<ArticleRecord>>;
}

/// Client for NewsAPI-compatible article APIs
pub struct NewsApiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl NewsApiClient {
    /// Create a client from configuration; the API key is required
    pub fn new(config: &AppConfig) -> Result<Self> {
        let api_key = config
            .news
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Config("News API key not configured".to_string()))?;

        let client = Self::build_client(config.news.request_timeout_secs, &config.news.proxy_url)?;

        Ok(Self {
            client,
            base_url: config.news.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Build HTTP client with optional proxy
    fn build_client(timeout_secs: u64, proxy_url: &Option<String>) -> Result<Client> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .gzip(true)
            .deflate(true)
            .brotli(true);

        if let Some(ref proxy) = proxy_url {
            let proxy = Proxy::all(proxy)
                .map_err(|e| Error::Config(format!("Invalid proxy URL: {}", e)))?;
            builder = builder.proxy(proxy);
            tracing::info!("Using HTTP proxy for news API requests");
        }

        builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))
    }

    fn endpoint_url(&self, request: &NormalizedRequest) -> String {
        format!("{}/{}", self.base_url, request.endpoint())
    }

    /// Pull the upstream `message` out of an error body, if there is one
    fn upstream_message(body: &str) -> String {
        serde_json::from_str::<ApiErrorBody>(body)
            .ok()
            .and_then(|b| b.message.or(b.code))
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_UPSTREAM_ERROR.to_string())
    }
}

#[async_trait::async_trait]
impl ArticleSource for NewsApiClient {
    async fn fetch(&self, request: &NormalizedRequest, max_articles: u32) -> Result<Vec<ArticleRecord>> {
        let url = self.endpoint_url(request);
        let page_size = max_articles.to_string();

        let mut query: Vec<(&str, &str)> = request
            .parameters()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        query.push(("apiKey", self.api_key.as_str()));
        query.push(("pageSize", page_size.as_str()));

        tracing::info!("Fetching articles from {} (pageSize={})", request, max_articles);

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("request to {} failed: {}", request.endpoint(), e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Upstream(format!("failed to read response body: {}", e)))?;

        if !status.is_success() {
            let message = Self::upstream_message(&body);
            tracing::warn!("News API returned {}: {}", status, message);
            return Err(Error::Upstream(message));
        }

        let decoded: ArticlesResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Upstream(format!("invalid response body: {}", e)))?;

        let mut articles = decoded.articles;
        articles.truncate(max_articles as usize);

        tracing::debug!("Fetched {} articles from {}", articles.len(), request.endpoint());
        Ok(articles)
    }
}
