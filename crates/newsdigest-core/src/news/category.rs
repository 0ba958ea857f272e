use std::collections::BTreeMap;
use std::fmt;

use super::query::{Endpoint, RawQuery, ENDPOINT_KEY};

pub const DEFAULT_COUNTRY: &str = "us";

const AI_QUERY: &str = "artificial intelligence OR machine learning";

/// Headline category presets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Category {
    #[default]
    Technology,
    Business,
    /// AI/ML coverage across all sources, newest first
    Ai,
    /// Top headlines from India regardless of requested country
    India,
    /// Any other news API category, passed through as-is
    Other(String),
}

impl Category {
    /// Parse a category name (case-insensitive)
    pub fn parse(name: &str) -> Self {
        let name = name.trim().to_lowercase();
        match name.as_str() {
            "" | "technology" => Category::Technology,
            "business" => Category::Business,
            "ai" => Category::Ai,
            "india" => Category::India,
            _ => Category::Other(name),
        }
    }

    /// Build the raw query for this category
    pub fn to_query(&self, country: Option<&str>) -> RawQuery {
        let country = country
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_COUNTRY);

        let mut params = BTreeMap::new();
        let endpoint = match self {
            Category::Technology | Category::Business => {
                params.insert("category".to_string(), self.to_string());
                params.insert("country".to_string(), country.to_string());
                Endpoint::TopHeadlines
            }
            Category::Ai => {
                params.insert("q".to_string(), AI_QUERY.to_string());
                params.insert("sortBy".to_string(), "publishedAt".to_string());
                Endpoint::Everything
            }
            Category::India => {
                params.insert("country".to_string(), "in".to_string());
                Endpoint::TopHeadlines
            }
            Category::Other(name) => {
                params.insert("category".to_string(), name.clone());
                params.insert("country".to_string(), country.to_string());
                Endpoint::TopHeadlines
            }
        };
        params.insert(ENDPOINT_KEY.to_string(), endpoint.as_str().to_string());

        RawQuery::Params(params)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Technology => f.write_str("technology"),
            Category::Business => f.write_str("business"),
            Category::Ai => f.write_str("ai"),
            Category::India => f.write_str("india"),
            Category::Other(name) => f.write_str(name),
        }
    }
}
