use std::collections::BTreeMap;

use anyhow::Result;

use newsdigest_core::news::{RawQuery, ENDPOINT_KEY};
use newsdigest_core::{AppConfig, SummaryPipeline};

/// Parse a `key=value` pair
pub fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{}`", s))?;
    if key.trim().is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in `{}`", s));
    }
    Ok((key.trim().to_string(), value.to_string()))
}

/// Build the raw query from command-line arguments
pub fn build_query(
    url: Option<String>,
    params: Vec<(String, String)>,
    endpoint: Option<String>,
) -> newsdigest_core::Result<RawQuery> {
    let params = if params.is_empty() && endpoint.is_none() {
        None
    } else {
        let mut map: BTreeMap<String, String> = params.into_iter().collect();
        if let Some(endpoint) = endpoint {
            map.insert(ENDPOINT_KEY.to_string(), endpoint);
        }
        Some(map)
    };

    RawQuery::from_parts(url, params)
}

pub async fn run(config: &AppConfig, raw: RawQuery, max_articles: Option<u32>) -> Result<()> {
    let max_articles = max_articles.unwrap_or(config.news.default_max_articles);
    let pipeline = SummaryPipeline::from_config(config)?;

    let stream = pipeline.stream_summaries(raw, max_articles).await?;
    super::print_events(stream).await
}
