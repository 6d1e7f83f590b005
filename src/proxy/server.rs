//! HTTP routing for the audio proxy.
//!
//! `GET /api/audio?url=<encoded-absolute-url>` fetches the upstream recording
//! and streams it back same-origin with a long-lived cache header.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, Response},
    routing::get,
    Router,
};
use futures_util::TryStreamExt;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use super::config::{ProxyConfig, CACHE_CONTROL, DEFAULT_CONTENT_TYPE};
use super::error::{ProxyError, Result};
use crate::playback::AUDIO_PROXY_ENDPOINT;

/// Shared state passed to all handlers
#[derive(Clone)]
pub struct ProxyState {
    pub client: reqwest::Client,
    pub config: Arc<ProxyConfig>,
}

impl ProxyState {
    pub fn new(config: ProxyConfig) -> Result<Self> {
        let client = config.build_client()?;
        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct AudioQuery {
    pub url: Option<String>,
}

pub fn create_router(state: ProxyState) -> Router {
    Router::new()
        .route(AUDIO_PROXY_ENDPOINT, get(proxy_audio))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Headers copied from the upstream response besides `Content-Type`.
const PASSTHROUGH_HEADERS: [header::HeaderName; 3] = [
    header::CONTENT_LENGTH,
    header::CONTENT_RANGE,
    header::ACCEPT_RANGES,
];

async fn proxy_audio(
    State(state): State<ProxyState>,
    query: Option<Query<AudioQuery>>,
    headers: HeaderMap,
) -> Result<Response<Body>> {
    let raw_url = query.and_then(|Query(query)| query.url);
    let upstream_url = parse_upstream_url(raw_url.as_deref(), &state.config)?;

    let mut request = state.client.get(upstream_url.clone());
    if let Some(range) = headers.get(header::RANGE) {
        request = request.header(header::RANGE, range.clone());
    }

    let response = tokio::time::timeout(state.config.upstream_timeout, request.send())
        .await
        .map_err(|_| ProxyError::UpstreamTimeout)??;

    let status = response.status();
    if !status.is_success() {
        return Err(ProxyError::UpstreamStatus(status));
    }

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .filter(|value| !value.as_bytes().is_empty())
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));

    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CACHE_CONTROL, CACHE_CONTROL);
    for name in PASSTHROUGH_HEADERS {
        if let Some(value) = response.headers().get(&name) {
            builder = builder.header(name, value.clone());
        }
    }

    debug!(url = %upstream_url, %status, "audio proxy: streaming upstream recording");
    let log_url = upstream_url.to_string();
    let stream = response.bytes_stream().inspect_err(move |err| {
        warn!(url = %log_url, error = %err, "audio proxy: upstream stream broke");
    });

    builder
        .body(Body::from_stream(stream))
        .map_err(|err| ProxyError::Internal(err.to_string()))
}

/// Validate the `url` parameter: present, absolute, http(s), allowed host.
pub fn parse_upstream_url(raw: Option<&str>, config: &ProxyConfig) -> Result<reqwest::Url> {
    let raw = raw.map(str::trim).filter(|raw| !raw.is_empty());
    let raw = raw.ok_or(ProxyError::MissingUrl)?;
    let url = reqwest::Url::parse(raw).map_err(|err| ProxyError::InvalidUrl(err.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ProxyError::UnsupportedScheme(url.scheme().to_string()));
    }
    let host = url
        .host_str()
        .ok_or_else(|| ProxyError::InvalidUrl("missing host".to_string()))?;
    if !config.allows_host(host) {
        return Err(ProxyError::HostNotAllowed(host.to_string()));
    }
    Ok(url)
}
