mod category;
mod fetcher;
mod models;
mod query;

pub use category::{Category, DEFAULT_COUNTRY};
pub use fetcher::{ArticleSource, NewsApiClient};
pub use models::{ArticleRecord, ArticleSourceRef, ArticleSummary, NO_CONTENT_PLACEHOLDER};
pub use query::{normalize, Endpoint, NormalizedRequest, RawQuery, ENDPOINT_KEY};
