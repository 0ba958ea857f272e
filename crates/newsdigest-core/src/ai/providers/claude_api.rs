use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::AiProvider;
use crate::config::AiConfig;
use crate::{Error, Result};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ClaudeMessage<'a>>,
}

#[derive(Serialize)]
struct ClaudeMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    content: Option<Vec<ClaudeContent>>,
    error: Option<ClaudeError>,
}

#[derive(Deserialize)]
struct ClaudeContent {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ClaudeError {
    message: String,
}

/// Claude/Anthropic messages API provider
pub struct ClaudeApiProvider {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl ClaudeApiProvider {
    pub fn new(api_key: &str, config: &AiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build Claude HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            api_base: config.claude_api_base.trim_end_matches('/').to_string(),
            model: config.claude_model.clone(),
            max_tokens: config.max_summary_tokens.max(1),
            temperature: config.temperature,
        })
    }
}

#[async_trait::async_trait]
impl AiProvider for ClaudeApiProvider {
    fn name(&self) -> &str {
        "claude_api"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ClaudeRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            messages: vec![ClaudeMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.api_base))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Summarization(format!("Claude API request failed: {}", e)))?;

        let status = response.status();
        let claude_response: ClaudeResponse = response
            .json()
            .await
            .map_err(|e| Error::Summarization(format!("Failed to parse Claude response ({}): {}", status, e)))?;

        if let Some(error) = claude_response.error {
            return Err(Error::Summarization(format!("Claude API error: {}", error.message)));
        }

        let content = claude_response
            .content
            .unwrap_or_default()
            .into_iter()
            .find_map(|c| c.text)
            .unwrap_or_default();

        Ok(content)
    }
}
