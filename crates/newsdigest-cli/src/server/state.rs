use std::sync::Arc;

use newsdigest_core::{AppConfig, SummaryPipeline};

/// Shared state handed to every route handler
#[derive(Clone)]
pub struct AppState {
    pub pipeline: SummaryPipeline,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pipeline: SummaryPipeline, config: Arc<AppConfig>) -> Self {
        Self { pipeline, config }
    }

    /// Batch size to use when a request does not name one
    pub fn max_articles(&self, requested: Option<u32>) -> u32 {
        requested.unwrap_or(self.config.news.default_max_articles)
    }
}
