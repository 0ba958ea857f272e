use chrono::{SecondsFormat, Utc};
use futures::StreamExt;
use serde::{Deserialize, Serialize};

use super::event::{Outcome, SummaryStream};
use crate::news::ArticleSummary;

/// Aggregated result of one fully consumed summary stream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsDigest {
    pub status: String,
    pub query_info: String,
    pub summaries: Vec<ArticleSummary>,
    pub failed: usize,
    /// RFC 3339, UTC
    pub timestamp: String,
}

/// Drain a stream into a digest; successes keep fetch order, failures are counted
pub async fn collect_digest(mut stream: SummaryStream, query_info: impl Into<String>) -> NewsDigest {
    let mut summaries = Vec::with_capacity(stream.total_count());
    let mut failed = 0;

    while let Some(event) = stream.next().await {
        match event.outcome {
            Outcome::Success(summary) => summaries.push(summary),
            Outcome::Failure(message) => {
                tracing::debug!("Digest skipping article {}: {}", event.sequence_number, message);
                failed += 1;
            }
        }
    }

    NewsDigest {
        status: "success".to_string(),
        query_info: query_info.into(),
        summaries,
        failed,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    }
}
