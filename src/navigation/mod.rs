//! Navigation watcher - stops playback when the user abandons the view.
//!
//! No single browser signal says "the user is leaving this view" both early
//! and reliably, so several overlapping heuristics feed one abandon callback.
//! Every heuristic may fire spuriously; the callback must be idempotent.

mod click;
#[cfg(target_arch = "wasm32")]
mod web;

use std::cell::RefCell;
use std::fmt;
use std::time::Duration;

use tracing::{debug, trace};

use crate::playback::PlaybackRegistry;

pub use click::{
    find_navigation_trigger, resolve_destination, route_path, ClickedElement, Destination,
    NAVIGATION_MARKER,
};
#[cfg(target_arch = "wasm32")]
pub(crate) use web::current_location;
#[cfg(target_arch = "wasm32")]
pub use web::{install_browser_listeners, BrowserListeners};

/// Timing for the polling fallback and the post-click catch-all.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigationConfig {
    pub poll_interval: Duration,
    pub click_grace: Duration,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            click_grace: Duration::from_millis(100),
        }
    }
}

/// Which signal detected the abandonment.
#[derive(Debug, Clone, PartialEq)]
pub enum AbandonReason {
    RouteChanged { from: String, to: String },
    LocationChanged { from: String, to: String },
    PageUnload,
    Hidden,
    RefocusedElsewhere { location: String },
    NavigationClick { destination: Destination },
    DeferredClick { location: String },
    HistoryPop,
    Manual,
}

impl fmt::Display for AbandonReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbandonReason::RouteChanged { from, to } => write!(f, "route {from} -> {to}"),
            AbandonReason::LocationChanged { from, to } => write!(f, "location {from} -> {to}"),
            AbandonReason::PageUnload => f.write_str("page unload"),
            AbandonReason::Hidden => f.write_str("document hidden"),
            AbandonReason::RefocusedElsewhere { location } => {
                write!(f, "refocused on {location}")
            }
            AbandonReason::NavigationClick { destination } => {
                write!(f, "navigation click to {destination:?}")
            }
            AbandonReason::DeferredClick { location } => {
                write!(f, "click followed by move to {location}")
            }
            AbandonReason::HistoryPop => f.write_str("history pop"),
            AbandonReason::Manual => f.write_str("manual stop"),
        }
    }
}

/// Outcome of [`NavigationWatcher::click`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickDisposition {
    /// A navigation trigger was recognised and playback already stopped.
    Abandoned,
    /// Call [`NavigationWatcher::deferred_check`] after the click grace.
    Deferred,
}

#[derive(Debug, Default)]
struct WatcherState {
    last_route: Option<String>,
    last_location: String,
    navigating: bool,
    click_location: Option<String>,
    blurred: bool,
    abandon_count: u64,
}

/// Centralises every abandonment signal behind one callback.
pub struct NavigationWatcher {
    origin: Option<String>,
    config: NavigationConfig,
    state: RefCell<WatcherState>,
    on_abandon: Box<dyn Fn(&AbandonReason)>,
}

impl NavigationWatcher {
    pub fn new(initial_location: impl Into<String>, on_abandon: impl Fn(&AbandonReason) + 'static) -> Self {
        Self {
            origin: None,
            config: NavigationConfig::default(),
            state: RefCell::new(WatcherState {
                last_location: initial_location.into(),
                ..Default::default()
            }),
            on_abandon: Box::new(on_abandon),
        }
    }

    /// Watcher whose abandon callback stops every player in `registry`.
    pub fn for_registry(registry: PlaybackRegistry, initial_location: impl Into<String>) -> Self {
        Self::new(initial_location, move |_| registry.stop_all())
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        let origin = origin.into();
        self.origin = (!origin.is_empty()).then_some(origin);
        self
    }

    pub fn with_config(mut self, config: NavigationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> NavigationConfig {
        self.config
    }

    /// Number of times the abandon callback has fired.
    pub fn abandon_count(&self) -> u64 {
        self.state.borrow().abandon_count
    }

    pub fn is_navigating(&self) -> bool {
        self.state.borrow().navigating
    }

    pub fn last_location(&self) -> String {
        self.state.borrow().last_location.clone()
    }

    fn abandon(&self, reason: AbandonReason) {
        {
            let mut state = self.state.borrow_mut();
            state.abandon_count += 1;
            state.navigating = false;
            state.click_location = None;
        }
        debug!(%reason, "navigation watcher: view abandoned, stopping playback");
        (self.on_abandon)(&reason);
    }

    /// Force the abandon callback, e.g. before opening a modal.
    pub fn stop_now(&self) {
        self.abandon(AbandonReason::Manual);
    }

    /// Route identity seen on a render. The first call only records.
    pub fn observe_route(&self, route: &str) {
        self.observe_route_at(route, route);
    }

    /// Like [`observe_route`](Self::observe_route), also syncing the
    /// remembered location so polling and deferred clicks do not re-detect a
    /// move the router already reported.
    pub fn observe_route_at(&self, route: &str, location: &str) {
        let previous = {
            let mut state = self.state.borrow_mut();
            if state.last_route.as_deref() == Some(route) {
                return;
            }
            state.last_location = location.to_string();
            state.last_route.replace(route.to_string())
        };
        if let Some(from) = previous {
            self.abandon(AbandonReason::RouteChanged {
                from,
                to: route.to_string(),
            });
        }
    }

    /// Polling fallback: compare the browser location with the remembered one.
    pub fn poll(&self, location: &str) {
        if let Some(from) = self.remember_location(location) {
            self.abandon(AbandonReason::LocationChanged {
                from,
                to: location.to_string(),
            });
        }
    }

    pub fn page_unload(&self) {
        self.abandon(AbandonReason::PageUnload);
    }

    pub fn visibility_changed(&self, hidden: bool) {
        if hidden {
            self.abandon(AbandonReason::Hidden);
        }
    }

    pub fn window_blurred(&self) {
        self.state.borrow_mut().blurred = true;
    }

    /// Abandons only if the location moved while focus was away.
    pub fn window_focused(&self, location: &str) {
        let was_blurred = std::mem::take(&mut self.state.borrow_mut().blurred);
        if self.remember_location(location).is_some() {
            trace!(was_blurred, "navigation watcher: focus returned on a different location");
            self.abandon(AbandonReason::RefocusedElsewhere {
                location: location.to_string(),
            });
        }
    }

    /// Capture-phase click. `path[0]` is the clicked element, followed by its
    /// ancestors. The route doubles as the location at click time.
    pub fn click(&self, path: &[ClickedElement], current_route: &str) -> ClickDisposition {
        self.click_at(path, current_route, current_route)
    }

    /// Click with the live browser location, which the deferred check compares
    /// against.
    pub fn click_at(
        &self,
        path: &[ClickedElement],
        current_route: &str,
        location: &str,
    ) -> ClickDisposition {
        if let Some(destination) =
            find_navigation_trigger(path, self.origin.as_deref(), current_route)
        {
            if destination.leaves(current_route) {
                self.abandon(AbandonReason::NavigationClick { destination });
                return ClickDisposition::Abandoned;
            }
        }

        let mut state = self.state.borrow_mut();
        state.navigating = true;
        state.click_location = Some(location.to_string());
        ClickDisposition::Deferred
    }

    /// Post-click catch-all: abandons if the click's navigating flag survived
    /// the grace period and the location has moved since the click.
    pub fn deferred_check(&self, location: &str) {
        let moved_from = {
            let mut state = self.state.borrow_mut();
            if !state.navigating {
                return;
            }
            state.navigating = false;
            match state.click_location.take() {
                Some(at_click) if at_click != location => Some(at_click),
                _ => None,
            }
        };
        if moved_from.is_some() {
            self.remember_location(location);
            self.abandon(AbandonReason::DeferredClick {
                location: location.to_string(),
            });
        }
    }

    pub fn pointer_released(&self) {
        self.clear_navigating();
    }

    pub fn key_released(&self) {
        self.clear_navigating();
    }

    pub fn history_popped(&self) {
        self.abandon(AbandonReason::HistoryPop);
    }

    fn clear_navigating(&self) {
        let mut state = self.state.borrow_mut();
        state.navigating = false;
        state.click_location = None;
    }

    /// Store `location`; returns the previous one if it differed.
    fn remember_location(&self, location: &str) -> Option<String> {
        let mut state = self.state.borrow_mut();
        if state.last_location == location {
            return None;
        }
        Some(std::mem::replace(
            &mut state.last_location,
            location.to_string(),
        ))
    }
}
