//! Normalization of caller input into a single request shape.
//!
//! Callers hand us either a full news API URL (as copied from a browser or
//! the API docs) or a parameter map. Both become a [`NormalizedRequest`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::{Error, Result};

/// Parameter key naming the endpoint inside a parameter map
pub const ENDPOINT_KEY: &str = "endpoint";

/// Query keys that carry credentials and must never be forwarded from input
const CREDENTIAL_KEYS: &[&str] = &["apikey", "api_key"];

fn is_credential_key(key: &str) -> bool {
    CREDENTIAL_KEYS.iter().any(|k| key.eq_ignore_ascii_case(k))
}

/// News API endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Endpoint {
    #[default]
    Everything,
    TopHeadlines,
    Sources,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Everything => "everything",
            Endpoint::TopHeadlines => "top-headlines",
            Endpoint::Sources => "sources",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Endpoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "everything" => Ok(Endpoint::Everything),
            "top-headlines" => Ok(Endpoint::TopHeadlines),
            "sources" => Ok(Endpoint::Sources),
            other => Err(Error::InvalidInput(format!("Unknown endpoint: {:?}", other))),
        }
    }
}

/// Raw query as supplied by a caller
#[derive(Debug, Clone, PartialEq)]
pub enum RawQuery {
    /// Full news API URL, e.g. `https://newsapi.org/v2/everything?q=rust`
    Url(String),
    /// Parameter map, optionally carrying an `endpoint` entry
    Params(BTreeMap<String, String>),
}

impl RawQuery {
    /// Pick the query from optional transport fields; the URL wins when both are set.
    /// A blank URL or an empty parameter map counts as absent.
    pub fn from_parts(url: Option<String>, params: Option<BTreeMap<String, String>>) -> Result<Self> {
        match (url, params) {
            (Some(url), _) if !url.trim().is_empty() => Ok(RawQuery::Url(url)),
            (_, Some(params)) if !params.is_empty() => Ok(RawQuery::Params(params)),
            _ => Err(Error::InvalidInput(
                "Either 'url' or 'params' must be provided".to_string(),
            )),
        }
    }
}

/// Canonical request handed to the article fetcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRequest {
    endpoint: Endpoint,
    parameters: BTreeMap<String, String>,
}

impl NormalizedRequest {
    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    pub fn parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }
}

impl fmt::Display for NormalizedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.endpoint)?;
        let mut sep = '?';
        for (key, value) in &self.parameters {
            write!(f, "{}{}={}", sep, key, value)?;
            sep = '&';
        }
        Ok(())
    }
}

/// Normalize a raw query into endpoint + parameters
pub fn normalize(input: RawQuery) -> Result<NormalizedRequest> {
    match input {
        RawQuery::Url(url) => normalize_url(&url),
        RawQuery::Params(params) => normalize_params(params),
    }
}

fn normalize_url(raw: &str) -> Result<NormalizedRequest> {
    let url = Url::parse(raw.trim())
        .map_err(|e| Error::InvalidInput(format!("Cannot parse URL {:?}: {}", raw, e)))?;

    let segments = url
        .path_segments()
        .ok_or_else(|| Error::InvalidInput(format!("URL has no path: {}", raw)))?;

    let endpoint = segments
        .filter(|s| !s.is_empty())
        .last()
        .ok_or_else(|| Error::InvalidInput(format!("URL does not name an endpoint: {}", raw)))?
        .parse::<Endpoint>()?;

    let mut parameters = BTreeMap::new();
    for (key, value) in url.query_pairs() {
        if is_credential_key(&key) {
            continue;
        }
        // First occurrence wins for repeated keys
        parameters
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }

    Ok(NormalizedRequest { endpoint, parameters })
}

fn normalize_params(mut params: BTreeMap<String, String>) -> Result<NormalizedRequest> {
    let endpoint = match params.remove(ENDPOINT_KEY) {
        Some(name) => name.parse::<Endpoint>()?,
        None => Endpoint::default(),
    };

    params.retain(|key, _| !is_credential_key(key));

    Ok(NormalizedRequest {
        endpoint,
        parameters: params,
    })
}
