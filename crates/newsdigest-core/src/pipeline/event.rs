use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::news::ArticleSummary;

/// Result for one article of a batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Outcome {
    #[serde(rename = "data")]
    Success(ArticleSummary),
    #[serde(rename = "error")]
    Failure(String),
}

/// One emitted unit of a summary stream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreamEvent {
    /// 1-based position in fetch order
    #[serde(rename = "article_num")]
    pub sequence_number: usize,
    /// Batch size, fixed for the whole stream
    #[serde(rename = "total_articles")]
    pub total_count: usize,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl StreamEvent {
    pub fn success(sequence_number: usize, total_count: usize, summary: ArticleSummary) -> Self {
        Self {
            sequence_number,
            total_count,
            outcome: Outcome::Success(summary),
        }
    }

    pub fn failure(sequence_number: usize, total_count: usize, message: impl Into<String>) -> Self {
        Self {
            sequence_number,
            total_count,
            outcome: Outcome::Failure(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }
}

/// Ordered stream of events for one request.
///
/// Dropping it stops the producer before the next article starts.
pub struct SummaryStream {
    inner: ReceiverStream<StreamEvent>,
    total_count: usize,
}

impl SummaryStream {
    pub(crate) fn new(rx: mpsc::Receiver<StreamEvent>, total_count: usize) -> Self {
        Self {
            inner: ReceiverStream::new(rx),
            total_count,
        }
    }

    /// Number of events this stream yields when fully consumed
    pub fn total_count(&self) -> usize {
        self.total_count
    }
}

impl Stream for SummaryStream {
    type Item = StreamEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn summary() -> ArticleSummary {
        ArticleSummary {
            title: "T".into(),
            source: "S".into(),
            published_date: "2025-01-01T00:00:00Z".into(),
            summary_text: "OK.".into(),
            url: "https://example.com".into(),
        }
    }

    #[test]
    fn test_success_wire_shape() {
        let value = serde_json::to_value(StreamEvent::success(1, 2, summary())).unwrap();
        assert_eq!(
            value,
            json!({
                "article_num": 1,
                "total_articles": 2,
                "data": {
                    "title": "T",
                    "source": "S",
                    "published_date": "2025-01-01T00:00:00Z",
                    "summary": "OK.",
                    "url": "https://example.com"
                }
            })
        );
    }

    #[test]
    fn test_failure_wire_shape() {
        let event = StreamEvent::failure(2, 3, "Error processing article unknown: boom");
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({"article_num": 2, "total_articles": 3, "error": "Error processing article unknown: boom"})
        );
        assert!(!event.is_success());
    }
}
