//! Fetch, summarize and stream.
//!
//! A request is normalized and fetched up front, so batch-scope failures
//! surface as an `Err` before any stream exists. Each article is then
//! summarized by a producer task that feeds a bounded channel; per-article
//! failures become [`Outcome::Failure`] events and the batch continues.

mod digest;
mod event;

pub use digest::{collect_digest, NewsDigest};
pub use event::{Outcome, StreamEvent, SummaryStream};

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tracing::Instrument;
use uuid::Uuid;

use crate::ai::Summarizer;
use crate::config::AppConfig;
use crate::news::{normalize, ArticleRecord, ArticleSource, NewsApiClient, RawQuery};
use crate::{Error, Result};

/// Events buffered between the producer and the consumer
const CHANNEL_CAPACITY: usize = 1;

/// Orchestrates the article source and the summarizer for each request
#[derive(Clone)]
pub struct SummaryPipeline {
    source: Arc<dyn ArticleSource>,
    summarizer: Arc<Summarizer>,
}

impl SummaryPipeline {
    pub fn new(source: Arc<dyn ArticleSource>, summarizer: Arc<Summarizer>) -> Self {
        Self { source, summarizer }
    }

    /// Build the news API client and the configured summarizer
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let source = NewsApiClient::new(config)?;
        let summarizer = Summarizer::new(config)?;
        Ok(Self::new(Arc::new(source), Arc::new(summarizer)))
    }

    /// Start streaming summaries for one request.
    ///
    /// Returns `InvalidInput` or `Upstream` before any event is produced;
    /// once a stream is returned it yields exactly one event per fetched
    /// article, in fetch order.
    pub async fn stream_summaries(&self, raw: RawQuery, max_articles: u32) -> Result<SummaryStream> {
        if max_articles == 0 {
            return Err(Error::InvalidInput("max_articles must be at least 1".to_string()));
        }

        let request = normalize(raw)?;
        let request_id = Uuid::new_v4();
        tracing::info!(%request_id, "Summarizing up to {} articles from {}", max_articles, request);

        let articles = self.source.fetch(&request, max_articles).await?;
        let total = articles.len();
        tracing::info!(%request_id, "Fetched {} articles", total);

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let span = tracing::info_span!("summary_stream", %request_id, endpoint = %request.endpoint(), total);
        tokio::spawn(produce(self.summarizer.clone(), articles, tx).instrument(span));

        Ok(SummaryStream::new(rx, total))
    }
}

async fn summarize_one(summarizer: &Summarizer, index: usize, total: usize, article: ArticleRecord) -> StreamEvent {
    let sequence_number = index + 1;
    match summarizer.summarize(&article).await {
        Ok(summary) => {
            tracing::debug!("Summarized article {}/{}: {}", sequence_number, total, article.display_title());
            StreamEvent::success(sequence_number, total, summary)
        }
        Err(e) => {
            tracing::warn!("Article {}/{} failed: {}", sequence_number, total, e);
            StreamEvent::failure(
                sequence_number,
                total,
                format!("Error processing article {}: {}", article.display_title(), e),
            )
        }
    }
}

async fn produce(summarizer: Arc<Summarizer>, articles: Vec<ArticleRecord>, tx: mpsc::Sender<StreamEvent>) {
    let total = articles.len();
    let concurrency = summarizer.concurrency();

    // `buffered` keeps fetch order while allowing `concurrency` calls in flight
    let mut events = stream::iter(articles.into_iter().enumerate())
        .map(|(index, article)| {
            let summarizer = summarizer.clone();
            async move { summarize_one(&summarizer, index, total, article).await }
        })
        .buffered(concurrency);

    let mut sent = 0;
    loop {
        // Wait for room before starting the next article
        let Ok(permit) = tx.reserve().await else {
            break;
        };

        tokio::select! {
            _ = tx.closed() => break,
            next = events.next() => match next {
                Some(event) => {
                    permit.send(event);
                    sent += 1;
                }
                None => break,
            },
        }
    }

    if sent < total {
        tracing::info!("Consumer went away after {}/{} articles, stopping", sent, total);
    } else {
        tracing::info!("Finished streaming {} articles", total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::providers::AiProvider;
    use crate::news::{NormalizedRequest, NO_CONTENT_PLACEHOLDER};
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    struct FakeSource {
        articles: Vec<ArticleRecord>,
        fail_with: Option<String>,
        requests: Mutex<Vec<(NormalizedRequest, u32)>>,
    }

    impl FakeSource {
        fn with_articles(articles: Vec<ArticleRecord>) -> Arc<Self> {
            Arc::new(Self {
                articles,
                fail_with: None,
                requests: Mutex::new(Vec::new()),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                articles: Vec::new(),
                fail_with: Some(message.to_string()),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait::async_trait]
    impl ArticleSource for FakeSource {
        async fn fetch(&self, request: &NormalizedRequest, max_articles: u32) -> Result<Vec<ArticleRecord>> {
            self.requests.lock().unwrap().push((request.clone(), max_articles));
            if let Some(ref message) = self.fail_with {
                return Err(Error::Upstream(message.clone()));
            }
            Ok(self.articles.iter().take(max_articles as usize).cloned().collect())
        }
    }

    /// Replies "OK." unless the prompt mentions `fail_on`
    struct FakeProvider {
        calls: AtomicUsize,
        fail_on: Option<String>,
        delay_ms: u64,
    }

    impl FakeProvider {
        fn ok() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail_on: None,
                delay_ms: 0,
            })
        }

        fn failing_on(title: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail_on: Some(title.to_string()),
                delay_ms: 0,
            })
        }

        fn slow(delay_ms: u64) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail_on: None,
                delay_ms,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl AiProvider for FakeProvider {
        fn name(&self) -> &str {
            "fake"
        }

        async fn complete(&self, prompt: &str) -> Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.delay_ms > 0 {
                // Earlier calls finish later, so completion order is reversed
                let delay = self.delay_ms.saturating_sub(call as u64 * 10);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            match self.fail_on {
                Some(ref title) if prompt.contains(title.as_str()) => {
                    Err(Error::Summarization("model unavailable".to_string()))
                }
                _ => Ok("OK.".to_string()),
            }
        }
    }

    fn article(title: &str) -> ArticleRecord {
        ArticleRecord {
            title: Some(title.to_string()),
            content: Some(format!("Body of {}", title)),
            url: Some(format!("https://example.com/{}", title)),
            ..Default::default()
        }
    }

    fn articles(n: usize) -> Vec<ArticleRecord> {
        (1..=n).map(|i| article(&format!("article-{}", i))).collect()
    }

    fn pipeline(source: Arc<FakeSource>, provider: Arc<FakeProvider>, concurrency: usize) -> SummaryPipeline {
        let summarizer = Summarizer::with_provider(provider).with_concurrency(concurrency);
        SummaryPipeline::new(source, Arc::new(summarizer))
    }

    fn top_headlines_us() -> RawQuery {
        RawQuery::Params(BTreeMap::from([
            ("endpoint".to_string(), "top-headlines".to_string()),
            ("country".to_string(), "us".to_string()),
        ]))
    }

    #[tokio::test]
    async fn test_two_article_scenario() {
        let source = FakeSource::with_articles(articles(3));
        let provider = FakeProvider::ok();
        let pipeline = pipeline(source.clone(), provider.clone(), 1);

        let stream = pipeline.stream_summaries(top_headlines_us(), 2).await.unwrap();
        assert_eq!(stream.total_count(), 2);
        let events: Vec<StreamEvent> = stream.collect().await;

        assert_eq!(events.len(), 2);
        for (i, event) in events.iter().enumerate() {
            assert_eq!(event.sequence_number, i + 1);
            assert_eq!(event.total_count, 2);
            match &event.outcome {
                Outcome::Success(summary) => assert_eq!(summary.summary_text, "OK."),
                other => panic!("expected success, got {:?}", other),
            }
        }

        let requests = source.requests.lock().unwrap();
        let (request, max) = &requests[0];
        assert_eq!(request.to_string(), "top-headlines?country=us");
        assert_eq!(*max, 2);
    }

    #[tokio::test]
    async fn test_n_events_numbered_in_order() {
        let pipeline = pipeline(FakeSource::with_articles(articles(5)), FakeProvider::ok(), 1);

        let events: Vec<StreamEvent> = pipeline
            .stream_summaries(top_headlines_us(), 5)
            .await
            .unwrap()
            .collect()
            .await;

        let numbers: Vec<usize> = events.iter().map(|e| e.sequence_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
        assert!(events.iter().all(|e| e.total_count == 5));
    }

    #[tokio::test]
    async fn test_failure_is_isolated() {
        let provider = FakeProvider::failing_on("article-2");
        let pipeline = pipeline(FakeSource::with_articles(articles(3)), provider.clone(), 1);

        let events: Vec<StreamEvent> = pipeline
            .stream_summaries(top_headlines_us(), 3)
            .await
            .unwrap()
            .collect()
            .await;

        assert_eq!(events.len(), 3);
        assert!(events[0].is_success());
        assert!(events[2].is_success());
        match &events[1].outcome {
            Outcome::Failure(message) => {
                assert!(message.starts_with("Error processing article article-2: "));
                assert!(message.contains("model unavailable"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_failure_without_title_says_unknown() {
        let untitled = ArticleRecord {
            content: Some("body".to_string()),
            ..Default::default()
        };
        let provider = FakeProvider::failing_on("Content: body");
        let pipeline = pipeline(FakeSource::with_articles(vec![untitled]), provider, 1);

        let events: Vec<StreamEvent> = pipeline
            .stream_summaries(top_headlines_us(), 1)
            .await
            .unwrap()
            .collect()
            .await;

        match &events[0].outcome {
            Outcome::Failure(message) => assert!(message.starts_with("Error processing article unknown: ")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_articles_skip_model() {
        let empty = vec![ArticleRecord::default(), ArticleRecord::default()];
        let provider = FakeProvider::ok();
        let pipeline = pipeline(FakeSource::with_articles(empty), provider.clone(), 1);

        let events: Vec<StreamEvent> = pipeline
            .stream_summaries(top_headlines_us(), 5)
            .await
            .unwrap()
            .collect()
            .await;

        assert_eq!(events.len(), 2);
        for event in &events {
            match &event.outcome {
                Outcome::Success(summary) => assert_eq!(summary.summary_text, NO_CONTENT_PLACEHOLDER),
                other => panic!("expected placeholder, got {:?}", other),
            }
        }
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_batch_yields_empty_stream() {
        let pipeline = pipeline(FakeSource::with_articles(Vec::new()), FakeProvider::ok(), 1);
        let stream = pipeline.stream_summaries(top_headlines_us(), 5).await.unwrap();
        assert_eq!(stream.total_count(), 0);
        let events: Vec<StreamEvent> = stream.collect().await;
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_upstream_error_before_stream() {
        let provider = FakeProvider::ok();
        let pipeline = pipeline(FakeSource::failing("apiKeyInvalid"), provider.clone(), 1);

        let err = pipeline.stream_summaries(top_headlines_us(), 5).await.err().unwrap();
        assert!(matches!(err, Error::Upstream(ref m) if m == "apiKeyInvalid"));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_input_before_fetch() {
        let source = FakeSource::with_articles(articles(1));
        let pipeline = pipeline(source.clone(), FakeProvider::ok(), 1);

        let err = pipeline
            .stream_summaries(RawQuery::Url("not a url".to_string()), 5)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, Error::InvalidInput(_)));

        let err = pipeline.stream_summaries(top_headlines_us(), 0).await.err().unwrap();
        assert!(matches!(err, Error::InvalidInput(_)));

        assert!(source.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_url_input_strips_credentials_before_fetch() {
        let source = FakeSource::with_articles(articles(1));
        let pipeline = pipeline(source.clone(), FakeProvider::ok(), 1);

        pipeline
            .stream_summaries(
                RawQuery::Url("https://source.example/v2/everything?q=test&apiKey=SECRET".to_string()),
                5,
            )
            .await
            .unwrap();

        let requests = source.requests.lock().unwrap();
        assert_eq!(requests[0].0.to_string(), "everything?q=test");
    }

    #[tokio::test]
    async fn test_dropping_stream_stops_summarization() {
        let provider = FakeProvider::ok();
        let pipeline = pipeline(FakeSource::with_articles(articles(10)), provider.clone(), 1);

        let mut stream = pipeline.stream_summaries(top_headlines_us(), 10).await.unwrap();
        let first = stream.next().await.unwrap();
        assert_eq!(first.sequence_number, 1);
        drop(stream);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(provider.calls() <= 2, "made {} calls after cancel", provider.calls());
    }

    #[tokio::test]
    async fn test_concurrent_summaries_keep_fetch_order() {
        let provider = FakeProvider::slow(60);
        let pipeline = pipeline(FakeSource::with_articles(articles(4)), provider.clone(), 4);

        let events: Vec<StreamEvent> = pipeline
            .stream_summaries(top_headlines_us(), 4)
            .await
            .unwrap()
            .collect()
            .await;

        let numbers: Vec<usize> = events.iter().map(|e| e.sequence_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        for (i, event) in events.iter().enumerate() {
            match &event.outcome {
                Outcome::Success(summary) => assert_eq!(summary.title, format!("article-{}", i + 1)),
                other => panic!("expected success, got {:?}", other),
            }
        }
        assert_eq!(provider.calls(), 4);
    }

    #[tokio::test]
    async fn test_collect_digest_counts_failures() {
        let pipeline = pipeline(
            FakeSource::with_articles(articles(3)),
            FakeProvider::failing_on("article-3"),
            1,
        );

        let stream = pipeline.stream_summaries(top_headlines_us(), 3).await.unwrap();
        let digest = collect_digest(stream, "top-headlines?country=us").await;

        assert_eq!(digest.status, "success");
        assert_eq!(digest.query_info, "top-headlines?country=us");
        assert_eq!(digest.summaries.len(), 2);
        assert_eq!(digest.summaries[0].title, "article-1");
        assert_eq!(digest.failed, 1);
        assert!(chrono::DateTime::parse_from_rfc3339(&digest.timestamp).is_ok());
    }
}
