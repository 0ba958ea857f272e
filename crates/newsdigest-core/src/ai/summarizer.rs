use std::sync::Arc;

use super::providers::{AiProvider, ClaudeApiProvider, OpenAiProvider};
use crate::config::AppConfig;
use crate::news::{ArticleRecord, ArticleSummary, NO_CONTENT_PLACEHOLDER};
use crate::{Error, Result};

fn summary_prompt(title: &str, content: &str) -> String {
    format!(
        "Please provide a concise summary of the following news article:\n\n\
Title: {title}\n\
Content: {content}\n\n\
Summary (in 2-3 sentences, focusing on key points and maintaining journalistic neutrality):"
    )
}

/// Article summarizer that wraps the configured provider
pub struct Summarizer {
    provider: Arc<dyn AiProvider>,
    concurrency: usize,
}

impl Summarizer {
    /// Create a new summarizer based on configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        let ai = &config.ai;

        let provider: Arc<dyn AiProvider> = match ai.provider.as_str() {
            "openai" => {
                let api_key = non_blank(&ai.openai_api_key)
                    .ok_or_else(|| Error::Config("OpenAI API key not configured".to_string()))?;
                Arc::new(OpenAiProvider::new(api_key, ai))
            }
            "claude_api" => {
                let api_key = non_blank(&ai.claude_api_key)
                    .ok_or_else(|| Error::Config("Claude API key not configured".to_string()))?;
                Arc::new(ClaudeApiProvider::new(api_key, ai)?)
            }
            other => {
                return Err(Error::Config(format!("Unknown AI provider: {}", other)));
            }
        };

        tracing::info!("Using AI provider: {}", provider.name());

        Ok(Self::with_provider(provider).with_concurrency(ai.concurrency))
    }

    /// Create a summarizer around an existing provider
    pub fn with_provider(provider: Arc<dyn AiProvider>) -> Self {
        Self {
            provider,
            concurrency: 1,
        }
    }

    /// Set how many model calls one request may keep in flight
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Get max concurrent summarization calls per request
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Summarize one article.
    ///
    /// Articles with neither content nor description get the placeholder
    /// without a model call. Failures are scoped to this article.
    pub async fn summarize(&self, article: &ArticleRecord) -> Result<ArticleSummary> {
        let Some(text) = article.summarizable_text() else {
            tracing::debug!("No content for '{}', using placeholder", article.display_title());
            return Ok(article.to_summary(NO_CONTENT_PLACEHOLDER.to_string()));
        };

        let title = article.title.as_deref().unwrap_or_default();
        let prompt = summary_prompt(title, text);

        let reply = self.provider.complete(&prompt).await.map_err(|e| match e {
            Error::Summarization(_) => e,
            other => Error::Summarization(other.to_string()),
        })?;

        let summary_text = reply.trim();
        if summary_text.is_empty() {
            return Err(Error::Summarization(format!(
                "{} returned an empty summary",
                self.provider.name()
            )));
        }

        Ok(article.to_summary(summary_text.to_string()))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}
