use serde::{Deserialize, Serialize};

/// Summary text used when an article carries nothing to summarize
pub const NO_CONTENT_PLACEHOLDER: &str = "No content available for summarization.";

/// Publisher reference embedded in an article record
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ArticleSourceRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// One article as returned by the news API
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    #[serde(default)]
    pub source: ArticleSourceRef,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl ArticleRecord {
    /// Text to summarize: the body if present, else the description
    pub fn summarizable_text(&self) -> Option<&str> {
        [self.content.as_deref(), self.description.as_deref()]
            .into_iter()
            .flatten()
            .find(|text| !text.trim().is_empty())
    }

    /// Title for log lines and failure messages
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or("unknown")
    }

    /// Build a summary carrying this article's metadata
    pub fn to_summary(&self, summary_text: String) -> ArticleSummary {
        ArticleSummary {
            title: self.title.clone().unwrap_or_default(),
            source: self.source.name.clone().unwrap_or_default(),
            published_date: self.published_at.clone().unwrap_or_default(),
            summary_text,
            url: self.url.clone().unwrap_or_default(),
        }
    }
}

/// Decoded body of a successful news API response
#[derive(Debug, Clone, Deserialize)]
pub struct ArticlesResponse {
    #[serde(default)]
    pub articles: Vec<ArticleRecord>,
}

/// Decoded body of a failed news API response
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A summarized article
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArticleSummary {
    pub title: String,
    pub source: String,
    pub published_date: String,
    #[serde(rename = "summary")]
    pub summary_text: String,
    pub url: String,
}

impl ArticleSummary {
    pub fn is_placeholder(&self) -> bool {
        self.summary_text == NO_CONTENT_PLACEHOLDER
    }
}
