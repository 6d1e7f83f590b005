//! Error types for the audio proxy.
//!
//! Every failure maps to a status code with an empty body; the details only go
//! to the log.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Missing url parameter")]
    MissingUrl,

    #[error("Invalid url: {0}")]
    InvalidUrl(String),

    #[error("Unsupported url scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Host not allowed: {0}")]
    HostNotAllowed(String),

    #[error("Upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Upstream did not respond in time")]
    UpstreamTimeout,

    #[error("Upstream responded with {0}")]
    UpstreamStatus(StatusCode),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ProxyError>;

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingUrl | ProxyError::InvalidUrl(_) | ProxyError::UnsupportedScheme(_) => {
                StatusCode::BAD_REQUEST
            }
            ProxyError::HostNotAllowed(_) => StatusCode::FORBIDDEN,
            ProxyError::Upstream(_) | ProxyError::UpstreamTimeout => StatusCode::BAD_GATEWAY,
            ProxyError::UpstreamStatus(status)
                if status.is_client_error() || status.is_server_error() =>
            {
                *status
            }
            ProxyError::UpstreamStatus(_) => StatusCode::BAD_GATEWAY,
            ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(%status, error = %self, "audio proxy: request failed");
        } else {
            debug!(%status, error = %self, "audio proxy: request rejected");
        }
        status.into_response()
    }
}
