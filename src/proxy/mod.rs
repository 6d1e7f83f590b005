//! Same-origin audio proxy.
//!
//! Players load third-party recordings through this endpoint so the browser
//! never makes a cross-origin media request.

mod config;
mod error;
mod server;

pub use config::{ProxyArgs, ProxyConfig, CACHE_CONTROL, DEFAULT_CONTENT_TYPE};
pub use error::{ProxyError, Result};
pub use server::{create_router, parse_upstream_url, AudioQuery, ProxyState};
