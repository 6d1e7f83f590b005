//! Recognising clicks that are about to navigate.

/// Attribute that marks an element as a navigation trigger. Its value, when
/// not empty, is the destination path.
pub const NAVIGATION_MARKER: &str = "data-navigation";

/// What the click path needs to know about one element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClickedElement {
    pub tag: String,
    pub href: Option<String>,
    /// Value of [`NAVIGATION_MARKER`], `Some("")` when present without a value.
    pub navigation_marker: Option<String>,
}

impl ClickedElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn anchor(href: impl Into<String>) -> Self {
        Self {
            tag: "a".to_string(),
            href: Some(href.into()),
            navigation_marker: None,
        }
    }

    pub fn marked(tag: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            href: None,
            navigation_marker: Some(destination.into()),
        }
    }
}

/// Where a recognised trigger leads.
#[derive(Debug, Clone, PartialEq)]
pub enum Destination {
    /// In-app path, without query or fragment.
    Internal(String),
    /// Another origin, or a scheme we leave the app for.
    External(String),
    /// Explicitly marked trigger with no declared destination.
    Unknown,
}

impl Destination {
    /// Whether following this destination leaves `current_route`.
    pub fn leaves(&self, current_route: &str) -> bool {
        match self {
            Destination::Internal(path) => path != &route_path(current_route),
            Destination::External(_) | Destination::Unknown => true,
        }
    }
}

/// Walk from the clicked element outwards and return the first navigation
/// trigger's destination. `path[0]` is the clicked element.
pub fn find_navigation_trigger(
    path: &[ClickedElement],
    origin: Option<&str>,
    current_route: &str,
) -> Option<Destination> {
    for element in path {
        if let Some(marker) = &element.navigation_marker {
            let marker = marker.trim();
            return Some(if marker.is_empty() {
                Destination::Unknown
            } else {
                resolve_destination(marker, origin, current_route)
            });
        }
        if element.tag.eq_ignore_ascii_case("a") {
            if let Some(href) = element.href.as_deref().map(str::trim) {
                if is_followable(href) {
                    return Some(resolve_destination(href, origin, current_route));
                }
            }
        }
    }
    None
}

fn is_followable(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    !(href.is_empty()
        || href.starts_with('#')
        || lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:"))
}

/// Resolve `href` against the app origin and current route.
pub fn resolve_destination(href: &str, origin: Option<&str>, current_route: &str) -> Destination {
    let href = href.trim();
    if let Some(origin) = origin.map(|o| o.trim_end_matches('/')) {
        if let Some(rest) = href.get(..origin.len()).and_then(|head| {
            head.eq_ignore_ascii_case(origin)
                .then(|| &href[origin.len()..])
        }) {
            if rest.is_empty() || rest.starts_with(['/', '?', '#']) {
                return Destination::Internal(route_path(if rest.is_empty() { "/" } else { rest }));
            }
        }
    }
    if href.starts_with("//") || href.contains("://") {
        return Destination::External(href.to_string());
    }
    if href.starts_with('/') {
        return Destination::Internal(route_path(href));
    }
    if href.starts_with('?') {
        return Destination::Internal(route_path(current_route));
    }

    // Relative to the current route's directory.
    let base = route_path(current_route);
    let dir = match base.rfind('/') {
        Some(idx) => &base[..=idx],
        None => "/",
    };
    Destination::Internal(normalize_path(&format!("{dir}{href}")))
}

/// Path portion of a route or location, without query and fragment.
pub fn route_path(route: &str) -> String {
    let end = route.find(['?', '#']).unwrap_or(route.len());
    let path = &route[..end];
    if path.is_empty() {
        "/".to_string()
    } else {
        normalize_path(path)
    }
}

fn normalize_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    format!("/{}", segments.join("/"))
}
