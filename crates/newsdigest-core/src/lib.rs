pub mod ai;
pub mod config;
pub mod error;
pub mod news;
pub mod pipeline;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use pipeline::{collect_digest, NewsDigest, Outcome, StreamEvent, SummaryPipeline, SummaryStream};
