use std::time::Duration;

use tracing::debug;

use super::registry::PlaybackRegistry;

/// Class applied to the anchored region while it pulses.
pub const PULSE_CLASS: &str = "anchor-pulse";
pub const PULSE_DURATION: Duration = Duration::from_millis(1500);

/// Scrolls a region into view and highlights it.
pub trait AnchorScroller {
    /// Returns `false` when no region with `anchor_id` exists.
    fn scroll_into_view(&self, anchor_id: &str) -> bool;

    fn pulse(&self, anchor_id: &str, duration: Duration);
}

/// Jump-back affordance for the currently playing item.
#[derive(Clone)]
pub struct ScrollAnchor {
    registry: PlaybackRegistry,
}

impl ScrollAnchor {
    pub fn new(registry: PlaybackRegistry) -> Self {
        Self { registry }
    }

    pub fn target(&self) -> Option<String> {
        self.registry.anchor()
    }

    /// Scroll to the current media's region and pulse it. Returns whether a
    /// region was found.
    pub fn jump(&self, scroller: &impl AnchorScroller) -> bool {
        let Some(anchor_id) = self.target() else {
            return false;
        };
        if !scroller.scroll_into_view(&anchor_id) {
            debug!(anchor = %anchor_id, "scroll anchor: region not on this page");
            return false;
        }
        scroller.pulse(&anchor_id, PULSE_DURATION);
        true
    }
}

/// [`AnchorScroller`] over the live document.
#[cfg(target_arch = "wasm32")]
pub struct DomScroller;

#[cfg(target_arch = "wasm32")]
impl AnchorScroller for DomScroller {
    fn scroll_into_view(&self, anchor_id: &str) -> bool {
        let Some(element) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|doc| doc.get_element_by_id(anchor_id))
        else {
            return false;
        };
        let options = web_sys::ScrollIntoViewOptions::new();
        options.set_behavior(web_sys::ScrollBehavior::Smooth);
        options.set_block(web_sys::ScrollLogicalPosition::Center);
        element.scroll_into_view_with_scroll_into_view_options(&options);
        true
    }

    fn pulse(&self, anchor_id: &str, duration: Duration) {
        let Some(element) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|doc| doc.get_element_by_id(anchor_id))
        else {
            return;
        };
        let _ = element.class_list().add_1(PULSE_CLASS);
        gloo_timers::callback::Timeout::new(duration.as_millis() as u32, move || {
            let _ = element.class_list().remove_1(PULSE_CLASS);
        })
        .forget();
    }
}
