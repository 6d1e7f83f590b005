use serde::{Deserialize, Serialize};

/// The media item the registry treats as the active playback target.
///
/// `source_uri` is the identity key; `id`, `label`, `caption` and `anchor_id`
/// are carried along for display and jump-back purposes only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentMedia {
    pub id: Option<String>,
    pub source_uri: String,
    pub label: Option<String>,
    pub caption: Option<String>,
    pub anchor_id: Option<String>,
}

impl CurrentMedia {
    pub fn new(source_uri: impl Into<String>) -> Self {
        Self {
            id: None,
            source_uri: source_uri.into(),
            label: None,
            caption: None,
            anchor_id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn with_anchor(mut self, anchor_id: impl Into<String>) -> Self {
        self.anchor_id = Some(anchor_id.into());
        self
    }

    /// Two descriptors name the same media iff their source URIs match.
    pub fn same_source(&self, other: &CurrentMedia) -> bool {
        self.source_uri == other.source_uri
    }

    pub fn is_source(&self, source_uri: &str) -> bool {
        self.source_uri == source_uri
    }

    /// Text for the now-playing affordance.
    pub fn display_label(&self) -> &str {
        self.label
            .as_deref()
            .filter(|label| !label.trim().is_empty())
            .unwrap_or("Recording")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_ignores_metadata() {
        let a = CurrentMedia::new("a.mp3").with_id("call-1").with_label("Call 1");
        let b = CurrentMedia::new("a.mp3").with_id("complaint-9");
        assert!(a.same_source(&b));
        assert_ne!(a, b);
        assert!(!a.same_source(&CurrentMedia::new("b.mp3")));
    }

    #[test]
    fn display_label_falls_back_when_blank() {
        assert_eq!(CurrentMedia::new("a.mp3").display_label(), "Recording");
        assert_eq!(
            CurrentMedia::new("a.mp3").with_label("  ").display_label(),
            "Recording"
        );
        assert_eq!(
            CurrentMedia::new("a.mp3").with_label("Call 7").display_label(),
            "Call 7"
        );
    }
}
