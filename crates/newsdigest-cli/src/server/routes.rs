use std::collections::BTreeMap;

use axum::{
    body::{Body, Bytes},
    extract::{Path, Query, State},
    http::header,
    response::{
        sse::{Event as SseEvent, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio_stream::{Stream, StreamExt};

use newsdigest_core::news::{normalize, Category, Endpoint, RawQuery, ENDPOINT_KEY};
use newsdigest_core::{collect_digest, Error, NewsDigest, SummaryStream};

use super::{ApiError, AppState};

pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// Body accepted by the streaming endpoints
#[derive(Debug, Default, Deserialize)]
pub struct SummarizeRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub params: Option<Map<String, Value>>,
    #[serde(default)]
    pub max_articles: Option<u32>,
}

impl SummarizeRequest {
    fn string_params(&mut self) -> Result<Option<BTreeMap<String, String>>, Error> {
        self.params.take().map(string_params).transpose()
    }

    fn into_query(mut self) -> Result<RawQuery, Error> {
        let params = self.string_params()?;
        RawQuery::from_parts(self.url, params)
    }
}

#[derive(Debug, Deserialize)]
pub struct HeadlinesQuery {
    pub country: Option<String>,
    pub category: Option<String>,
    pub q: Option<String>,
    pub max_articles: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub country: Option<String>,
    pub max_articles: Option<u32>,
}

/// JSON parameter values become strings; nulls are dropped
fn string_params(params: Map<String, Value>) -> Result<BTreeMap<String, String>, Error> {
    let mut out = BTreeMap::new();
    for (key, value) in params {
        let value = match value {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => continue,
            Value::Array(_) | Value::Object(_) => {
                return Err(Error::InvalidInput(format!(
                    "Parameter '{}' must be a string, number or boolean",
                    key
                )));
            }
        };
        out.insert(key, value);
    }
    Ok(out)
}

fn ndjson_response(stream: SummaryStream) -> Response {
    let lines = stream.map(|event| {
        serde_json::to_vec(&event).map(|mut line| {
            line.push(b'\n');
            line
        })
    });

    ([(header::CONTENT_TYPE, NDJSON_CONTENT_TYPE)], Body::from_stream(lines)).into_response()
}

/// GET / - Service status
pub async fn root() -> Json<Value> {
    Json(json!({
        "status": "active",
        "message": "News summarization service is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// POST /summarize - Stream summaries as newline-delimited JSON
pub async fn summarize(
    State(state): State<AppState>,
    Json(body): Json<SummarizeRequest>,
) -> Result<Response, ApiError> {
    let max_articles = state.max_articles(body.max_articles);
    let raw = body.into_query()?;

    let stream = state.pipeline.stream_summaries(raw, max_articles).await?;
    Ok(ndjson_response(stream))
}

/// POST /summarize/events - Stream summaries as server-sent events
pub async fn summarize_events(
    State(state): State<AppState>,
    Json(body): Json<SummarizeRequest>,
) -> Result<Sse<impl Stream<Item = Result<SseEvent, axum::Error>>>, ApiError> {
    let max_articles = state.max_articles(body.max_articles);
    let raw = body.into_query()?;

    let stream = state.pipeline.stream_summaries(raw, max_articles).await?;
    let events = stream.map(|event| SseEvent::default().json_data(&event));

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// Parse an optional JSON body; only an empty body means "no body"
fn optional_body(body: &[u8]) -> Result<SummarizeRequest, Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(SummarizeRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| Error::InvalidInput(format!("Malformed request body: {}", e)))
}

/// POST /top-headlines - Like `/summarize`, restricted to the top-headlines endpoint.
/// Parameters take precedence over a URL.
pub async fn top_headlines_stream(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let mut body = optional_body(&body)?;
    let max_articles = state.max_articles(body.max_articles);

    let params = body.string_params()?.filter(|p| !p.is_empty());
    let url = body.url.take().filter(|u| !u.trim().is_empty());

    let raw = match (params, url) {
        (Some(mut params), _) => {
            params.insert(ENDPOINT_KEY.to_string(), Endpoint::TopHeadlines.to_string());
            RawQuery::Params(params)
        }
        (None, Some(url)) => {
            let endpoint = normalize(RawQuery::Url(url.clone()))?.endpoint();
            if endpoint != Endpoint::TopHeadlines {
                return Err(Error::InvalidInput(format!(
                    "URL must target the top-headlines endpoint, got '{}'",
                    endpoint
                ))
                .into());
            }
            RawQuery::Url(url)
        }
        (None, None) => RawQuery::Params(BTreeMap::from([
            ("country".to_string(), "us".to_string()),
            (ENDPOINT_KEY.to_string(), Endpoint::TopHeadlines.to_string()),
        ])),
    };

    let stream = state.pipeline.stream_summaries(raw, max_articles).await?;
    Ok(ndjson_response(stream))
}

/// GET /top-headlines - Aggregated digest of top headlines
pub async fn top_headlines_digest(
    State(state): State<AppState>,
    Query(query): Query<HeadlinesQuery>,
) -> Result<Json<NewsDigest>, ApiError> {
    let mut params: BTreeMap<String, String> = [
        ("country", query.country),
        ("category", query.category),
        ("q", query.q),
    ]
    .into_iter()
    .filter_map(|(key, value)| {
        value
            .filter(|v| !v.trim().is_empty())
            .map(|v| (key.to_string(), v))
    })
    .collect();

    if params.is_empty() {
        return Err(Error::InvalidInput(
            "At least one of 'country', 'category' or 'q' is required".to_string(),
        )
        .into());
    }
    params.insert(ENDPOINT_KEY.to_string(), Endpoint::TopHeadlines.to_string());

    let raw = RawQuery::Params(params);
    let query_info = normalize(raw.clone())?.to_string();
    let max_articles = state.max_articles(query.max_articles);

    let stream = state.pipeline.stream_summaries(raw, max_articles).await?;
    Ok(Json(collect_digest(stream, query_info).await))
}

/// GET /headlines/:category - Stream a category preset
pub async fn category_headlines(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(query): Query<CategoryQuery>,
) -> Result<Response, ApiError> {
    let category = Category::parse(&category);
    tracing::debug!("Category headlines: {}", category);

    let raw = category.to_query(query.country.as_deref());
    let max_articles = state.max_articles(query.max_articles);

    let stream = state.pipeline.stream_summaries(raw, max_articles).await?;
    Ok(ndjson_response(stream))
}
