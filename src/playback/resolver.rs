/// Default same-origin endpoint that relays remote audio.
pub const AUDIO_PROXY_ENDPOINT: &str = "/api/audio";

/// Maps a media source URI to the URL an engine should load.
///
/// Relative paths, `data:`/`blob:` URIs and absolute URLs on our own origin
/// load directly. Everything else is fetched through the proxy endpoint so
/// third-party hosts never hit CORS and responses can be cached.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaResolver {
    proxy_endpoint: String,
    origin: Option<String>,
}

impl Default for MediaResolver {
    fn default() -> Self {
        Self {
            proxy_endpoint: AUDIO_PROXY_ENDPOINT.to_string(),
            origin: None,
        }
    }
}

impl MediaResolver {
    pub fn new(proxy_endpoint: impl Into<String>) -> Self {
        Self {
            proxy_endpoint: proxy_endpoint.into(),
            origin: None,
        }
    }

    /// Treat absolute URLs on `origin` (e.g. `https://desk.example.com`) as local.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        let origin = origin.into();
        let origin = origin.trim_end_matches('/').to_string();
        self.origin = (!origin.is_empty()).then_some(origin);
        self
    }

    pub fn resolve(&self, source_uri: &str) -> String {
        let uri = source_uri.trim();
        if self.is_direct(uri) {
            return self.strip_origin(uri).to_string();
        }
        format!(
            "{}?url={}",
            self.proxy_endpoint,
            urlencoding::encode(&absolutize(uri))
        )
    }

    pub fn is_proxied(&self, source_uri: &str) -> bool {
        !self.is_direct(source_uri.trim())
    }

    fn is_direct(&self, uri: &str) -> bool {
        if uri.is_empty() {
            return true;
        }
        let lower = uri.to_ascii_lowercase();
        if lower.starts_with("data:") || lower.starts_with("blob:") {
            return true;
        }
        if let Some(origin) = &self.origin {
            if same_origin(uri, origin) {
                return true;
            }
        }
        !has_scheme(&lower) && !uri.starts_with("//")
    }

    fn strip_origin<'a>(&self, uri: &'a str) -> &'a str {
        match &self.origin {
            Some(origin) if same_origin(uri, origin) => {
                let rest = &uri[origin.len()..];
                if rest.is_empty() {
                    "/"
                } else {
                    rest
                }
            }
            _ => uri,
        }
    }
}

/// Resolve with the default endpoint and no known origin.
pub fn resolve_media_url(source_uri: &str) -> String {
    MediaResolver::default().resolve(source_uri)
}

fn has_scheme(lower: &str) -> bool {
    let Some((scheme, _)) = lower.split_once(':') else {
        return false;
    };
    !scheme.is_empty()
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
        && scheme.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}

fn same_origin(uri: &str, origin: &str) -> bool {
    let (Some(head), Some(tail)) = (uri.get(..origin.len()), uri.get(origin.len()..)) else {
        return false;
    };
    head.eq_ignore_ascii_case(origin) && matches!(tail.chars().next(), None | Some('/' | '?' | '#'))
}

fn absolutize(uri: &str) -> String {
    if let Some(rest) = uri.strip_prefix("//") {
        format!("https://{rest}")
    } else {
        uri.to_string()
    }
}
