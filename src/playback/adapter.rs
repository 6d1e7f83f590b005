//! Player adapter - binds one transport engine to the shared registry.
//!
//! Each rendered player owns exactly one adapter and the adapter owns exactly
//! one engine. The adapter keeps the engine's real play/pause state in line
//! with the registry: claiming "current" pauses everyone else, and every
//! registry change re-runs [`PlaybackHandle::reconcile`] on every adapter.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::{debug, trace, warn};

use super::engine::{EngineEvent, EngineListener, EngineResult, EventSink, TransportEngine};
use super::media::CurrentMedia;
use super::registry::{PlaybackHandle, PlaybackRegistry, PlaybackSnapshot, PlayerKey};
use super::resolver::MediaResolver;

/// Step used by the rewind / fast-forward buttons.
pub const SKIP_SECONDS: f64 = 10.0;

/// How a player participates in the "current media" contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerRole {
    /// Regular player: starting it makes it the current media.
    #[default]
    Claiming,
    /// Page-header preview of a record. Never claims and never clears current.
    Header,
    /// Embedded preview. Never claims, but clears current when it finishes
    /// while it is current.
    NonClaiming,
}

impl PlayerRole {
    pub fn claims_current(self) -> bool {
        matches!(self, PlayerRole::Claiming)
    }

    pub fn clears_on_finish(self) -> bool {
        !matches!(self, PlayerRole::Header)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerOptions {
    pub id: Option<String>,
    pub label: Option<String>,
    pub caption: Option<String>,
    pub anchor_id: Option<String>,
    pub role: PlayerRole,
}

impl PlayerOptions {
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

    pub fn with_role(mut self, role: PlayerRole) -> Self {
        self.role = role;
        self
    }
}

/// Per-player UI state.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub is_loading: bool,
    pub error: Option<String>,
    /// This player's belief about its engine, driven only by engine events.
    pub is_playing: bool,
    pub position: f64,
    pub duration: f64,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            is_loading: true,
            error: None,
            is_playing: false,
            position: 0.0,
            duration: 0.0,
        }
    }
}

impl PlayerState {
    /// Play, pause and seek are only available once loaded and without error.
    pub fn controls_enabled(&self) -> bool {
        !self.is_loading && self.error.is_none()
    }

    /// Position as a fraction of duration, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 {
            (self.position / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

type StateListener = Rc<dyn Fn(&PlayerState)>;

struct PlayerInner<E: TransportEngine> {
    key: PlayerKey,
    source_uri: String,
    resolved_url: String,
    options: PlayerOptions,
    registry: PlaybackRegistry,
    engine: E,
    state: RefCell<PlayerState>,
    listener: RefCell<Option<StateListener>>,
    released: Cell<bool>,
}

impl<E: TransportEngine> PlayerInner<E> {
    fn media(&self) -> CurrentMedia {
        CurrentMedia {
            id: self.options.id.clone(),
            source_uri: self.source_uri.clone(),
            label: self.options.label.clone(),
            caption: self.options.caption.clone(),
            anchor_id: self.options.anchor_id.clone(),
        }
    }

    fn claims(&self) -> bool {
        self.options.role.claims_current()
    }

    fn is_current_in(&self, snapshot: &PlaybackSnapshot) -> bool {
        snapshot.is_current(self.key, &self.source_uri, self.claims())
    }

    fn is_current(&self) -> bool {
        self.is_current_in(&self.registry.snapshot())
    }

    /// Only the owner of current drives the registry's playing flag. Header
    /// and preview instances mirror the source but own nothing.
    fn owns_current(&self) -> bool {
        self.claims() && self.is_current()
    }

    fn state(&self) -> PlayerState {
        self.state.borrow().clone()
    }

    fn update(&self, change: impl FnOnce(&mut PlayerState)) {
        let next = {
            let mut state = self.state.borrow_mut();
            let before = state.clone();
            change(&mut state);
            if *state == before {
                return;
            }
            state.clone()
        };
        let listener = self.listener.borrow().clone();
        if let Some(listener) = listener {
            listener(&next);
        }
    }

    fn start_engine(&self) {
        if let Err(err) = self.engine.play() {
            warn!(key = %self.key, error = %err, "player: play failed");
        }
    }

    fn toggle(&self) {
        if self.released.get() {
            return;
        }
        if self.engine.is_playing() {
            if let Err(err) = self.engine.pause() {
                warn!(key = %self.key, error = %err, "player: pause failed");
            }
            return;
        }
        if !self.state.borrow().controls_enabled() {
            trace!(key = %self.key, "player: toggle ignored, engine not ready");
            return;
        }

        self.take_the_floor();
        // Reconciliation may already have started us.
        if !self.engine.is_playing() {
            self.start_engine();
        }
    }

    /// Make sure nobody else is audible before this engine starts.
    ///
    /// Claiming players become current. Other roles pause everyone else and
    /// lower the playing flag, so reconciliation does not restart the owner
    /// underneath them.
    fn take_the_floor(&self) {
        if self.claims() {
            self.registry.claim(self.key, self.media());
            return;
        }
        self.registry.silence_others(self.key);
        self.registry.set_playing(false);
    }

    fn seek_to(&self, seconds: f64) {
        if self.released.get() || !self.state.borrow().controls_enabled() {
            return;
        }
        let duration = self.known_duration();
        let target = if duration > 0.0 {
            seconds.clamp(0.0, duration)
        } else {
            seconds.max(0.0)
        };
        if let Err(err) = self.engine.seek_to(target) {
            warn!(key = %self.key, error = %err, "player: seek failed");
        }
    }

    fn known_duration(&self) -> f64 {
        let duration = self.state.borrow().duration;
        if duration > 0.0 {
            duration
        } else {
            self.engine.duration()
        }
    }

    fn release(&self) {
        if self.released.replace(true) {
            return;
        }
        if self.engine.is_playing() {
            if let Err(err) = self.engine.pause() {
                warn!(key = %self.key, error = %err, "player: pause on release failed");
            }
        }
        let snapshot = self.registry.snapshot();
        let was_playing_owner = snapshot.playing && snapshot.owner == Some(self.key);

        self.engine.destroy();
        self.registry.unregister(self.key);
        self.listener.borrow_mut().take();
        if was_playing_owner {
            self.registry.set_playing(false);
        }
        debug!(key = %self.key, source = %self.source_uri, "player: released");
    }
}

impl<E: TransportEngine> EngineListener for PlayerInner<E> {
    fn on_engine_event(&self, event: EngineEvent) {
        if self.released.get() {
            return;
        }
        trace!(key = %self.key, ?event, "player: engine event");
        match event {
            EngineEvent::Ready { duration } => {
                let duration = if duration.is_finite() && duration > 0.0 {
                    duration
                } else {
                    self.engine.duration()
                };
                self.update(|state| {
                    state.is_loading = false;
                    state.duration = duration;
                });
            }
            EngineEvent::Error(message) => {
                warn!(key = %self.key, source = %self.source_uri, %message, "player: failed to load audio");
                self.update(|state| {
                    state.is_loading = false;
                    state.is_playing = false;
                    state.error = Some(message);
                });
            }
            EngineEvent::Play => {
                // Engines may report a play that never happened (or was undone
                // before the event was delivered); only a live engine claims.
                if !self.engine.is_playing() {
                    debug!(key = %self.key, "player: ignoring play event from idle engine");
                    return;
                }
                self.take_the_floor();
                self.update(|state| state.is_playing = true);
                if self.owns_current() {
                    self.registry.set_playing(true);
                }
            }
            EngineEvent::Pause => {
                if self.engine.is_playing() {
                    trace!(key = %self.key, "player: ignoring stale pause event");
                    return;
                }
                self.update(|state| state.is_playing = false);
                if self.owns_current() {
                    self.registry.set_playing(false);
                }
            }
            EngineEvent::Finish => {
                if let Err(err) = self.engine.seek_to(0.0) {
                    trace!(key = %self.key, error = %err, "player: rewind after finish failed");
                }
                self.update(|state| {
                    state.is_playing = false;
                    state.position = 0.0;
                });
                if self.is_current() {
                    if self.options.role.clears_on_finish() {
                        self.registry.set_current(None);
                    } else {
                        self.registry.set_playing(false);
                    }
                }
            }
            EngineEvent::TimeUpdate(position) => {
                let position = if position.is_finite() {
                    position.max(0.0)
                } else {
                    0.0
                };
                self.update(|state| state.position = position);
            }
        }
    }
}

impl<E: TransportEngine> PlaybackHandle for PlayerInner<E> {
    fn source_uri(&self) -> &str {
        &self.source_uri
    }

    fn claims_current(&self) -> bool {
        self.claims()
    }

    fn is_engine_playing(&self) -> bool {
        !self.released.get() && self.engine.is_playing()
    }

    fn pause_engine(&self) -> EngineResult<()> {
        self.engine.pause()
    }

    fn stop_engine(&self) -> EngineResult<()> {
        if !self.engine.is_playing() {
            return Ok(());
        }
        self.engine.pause()?;
        self.engine.seek_to(0.0)?;
        self.update(|state| state.position = 0.0);
        Ok(())
    }

    fn reconcile(&self, snapshot: &PlaybackSnapshot) {
        if self.released.get() {
            return;
        }
        let is_current = self.is_current_in(snapshot);
        let engine_playing = self.engine.is_playing();

        if is_current && snapshot.playing && !engine_playing {
            if self.claims() && self.state.borrow().controls_enabled() {
                trace!(key = %self.key, "player: reconcile starting current media");
                self.registry.silence_others(self.key);
                self.start_engine();
            }
        } else if !is_current && engine_playing && (self.claims() || snapshot.playing) {
            // Non-claiming previews only yield to media that is actually playing.
            trace!(key = %self.key, "player: reconcile pausing non-current media");
            if let Err(err) = self.engine.pause() {
                warn!(key = %self.key, error = %err, "player: pause during reconcile failed");
            }
        }
    }
}

/// Starts building a player for `source_uri`.
pub struct PlayerBuilder {
    registry: PlaybackRegistry,
    source_uri: String,
    options: PlayerOptions,
    resolver: MediaResolver,
}

impl PlayerBuilder {
    pub fn new(registry: &PlaybackRegistry, source_uri: impl Into<String>) -> Self {
        Self {
            registry: registry.clone(),
            source_uri: source_uri.into(),
            options: PlayerOptions::default(),
            resolver: MediaResolver::default(),
        }
    }

    pub fn options(mut self, options: PlayerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn resolver(mut self, resolver: MediaResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Create the engine through `factory`, register with the registry and
    /// start loading.
    pub fn mount<E, F>(self, factory: F) -> PlayerAdapter<E>
    where
        E: TransportEngine + 'static,
        F: FnOnce(&str, EventSink) -> E,
    {
        let resolved_url = self.resolver.resolve(&self.source_uri);
        let key = self.registry.allocate_key();
        let registry = self.registry.clone();

        let inner = Rc::new_cyclic(|weak: &Weak<PlayerInner<E>>| {
            let listener: Weak<dyn EngineListener> = weak.clone();
            let engine = factory(&resolved_url, EventSink::new(listener));
            PlayerInner {
                key,
                source_uri: self.source_uri,
                resolved_url: resolved_url.clone(),
                options: self.options,
                registry: self.registry,
                engine,
                state: RefCell::new(PlayerState::default()),
                listener: RefCell::new(None),
                released: Cell::new(false),
            }
        });

        let handle: Weak<dyn PlaybackHandle> = Rc::downgrade(&inner) as Weak<dyn PlaybackHandle>;
        registry.register(key, handle);
        debug!(%key, source = %inner.source_uri, url = %inner.resolved_url, "player: mounted");
        inner.engine.load();

        PlayerAdapter { inner }
    }
}

/// One mounted player. Dropping it releases the engine.
pub struct PlayerAdapter<E: TransportEngine + 'static> {
    inner: Rc<PlayerInner<E>>,
}

impl<E: TransportEngine + 'static> PlayerAdapter<E> {
    pub fn key(&self) -> PlayerKey {
        self.inner.key
    }

    pub fn source_uri(&self) -> &str {
        &self.inner.source_uri
    }

    /// URL handed to the engine, after proxy wrapping.
    pub fn resolved_url(&self) -> &str {
        &self.inner.resolved_url
    }

    pub fn options(&self) -> &PlayerOptions {
        &self.inner.options
    }

    pub fn engine(&self) -> &E {
        &self.inner.engine
    }

    pub fn state(&self) -> PlayerState {
        self.inner.state()
    }

    pub fn is_current(&self) -> bool {
        self.inner.is_current()
    }

    /// Called with the new state after every change.
    pub fn on_state_change(&self, listener: impl Fn(&PlayerState) + 'static) {
        *self.inner.listener.borrow_mut() = Some(Rc::new(listener));
    }

    /// Deliver an engine event directly, bypassing the engine's sink.
    pub fn handle_event(&self, event: EngineEvent) {
        self.inner.on_engine_event(event);
    }

    /// User play/pause. Pauses if the engine is actually playing, otherwise
    /// claims current and starts.
    pub fn toggle(&self) {
        self.inner.toggle();
    }

    /// Relative seek, clamped to `[0, duration]`.
    pub fn skip(&self, delta_seconds: f64) {
        let from = self.inner.engine.current_time();
        self.inner.seek_to(from + delta_seconds);
    }

    pub fn seek_to(&self, seconds: f64) {
        self.inner.seek_to(seconds);
    }

    /// Absolute seek to a fraction of the duration, as from a click on the
    /// progress bar.
    pub fn seek_fraction(&self, fraction: f64) {
        let duration = self.inner.known_duration();
        self.inner.seek_to(fraction.clamp(0.0, 1.0) * duration);
    }

    /// Pause, destroy the engine and unregister. Idempotent; also runs on drop.
    pub fn release(&self) {
        self.inner.release();
    }

    pub fn is_released(&self) -> bool {
        self.inner.released.get()
    }
}

impl<E: TransportEngine + 'static> Drop for PlayerAdapter<E> {
    fn drop(&mut self) {
        self.inner.release();
    }
}
