//! Playback registry - the single source of truth for which media is current
//! and whether it is playing.
//!
//! The registry lives for the whole client session and is handed down through
//! context rather than living in a module global. Every mounted player
//! registers a weak [`PlaybackHandle`]; the registry drives reconciliation and
//! `stop_all` through that list.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace, warn};

use super::engine::EngineResult;
use super::media::CurrentMedia;

/// Identity of one mounted player within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerKey(u64);

impl fmt::Display for PlayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player#{}", self.0)
    }
}

/// What the registry needs from a mounted player.
pub trait PlaybackHandle {
    fn source_uri(&self) -> &str;

    /// Whether this player takes ownership of "current" when it starts.
    fn claims_current(&self) -> bool;

    /// Live engine state.
    fn is_engine_playing(&self) -> bool;

    fn pause_engine(&self) -> EngineResult<()>;

    /// Pause and rewind if the engine is playing.
    fn stop_engine(&self) -> EngineResult<()>;

    /// Bring the engine in line with `snapshot`.
    fn reconcile(&self, snapshot: &PlaybackSnapshot);
}

/// Immutable view of registry state at one revision.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackSnapshot {
    pub current: Option<CurrentMedia>,
    pub playing: bool,
    /// Player that most recently claimed `current`.
    pub owner: Option<PlayerKey>,
    pub revision: u64,
}

impl PlaybackSnapshot {
    /// Whether the player identified by `key` is the current media.
    ///
    /// Claiming players must also be the owner so that two cards bound to the
    /// same recording never both start. Non-claiming players mirror whatever
    /// source is current.
    pub fn is_current(&self, key: PlayerKey, source_uri: &str, claims_current: bool) -> bool {
        match &self.current {
            Some(media) if media.is_source(source_uri) => {
                !claims_current || self.owner == Some(key)
            }
            _ => false,
        }
    }

    pub fn anchor(&self) -> Option<&str> {
        self.current.as_ref().and_then(|media| media.anchor_id.as_deref())
    }
}

struct Registration {
    key: PlayerKey,
    handle: Weak<dyn PlaybackHandle>,
}

type ObserverFn = Rc<dyn Fn(&PlaybackSnapshot)>;

struct Observer {
    id: u64,
    /// Cleared by the owning [`Subscription`] on drop.
    alive: Rc<Cell<bool>>,
    callback: ObserverFn,
}

struct RegistryInner {
    current: Option<CurrentMedia>,
    playing: bool,
    owner: Option<PlayerKey>,
    revision: u64,
    next_key: u64,
    handles: Vec<Registration>,
    next_observer: u64,
    observers: Vec<Observer>,
}

impl RegistryInner {
    fn new() -> Self {
        Self {
            current: None,
            playing: false,
            owner: None,
            revision: 0,
            next_key: 1,
            handles: Vec::new(),
            next_observer: 1,
            observers: Vec::new(),
        }
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            current: self.current.clone(),
            playing: self.playing,
            owner: self.owner,
            revision: self.revision,
        }
    }

    fn live_handles(&mut self) -> Vec<(PlayerKey, Rc<dyn PlaybackHandle>)> {
        self.handles.retain(|entry| entry.handle.strong_count() > 0);
        self.handles
            .iter()
            .filter_map(|entry| entry.handle.upgrade().map(|handle| (entry.key, handle)))
            .collect()
    }

    /// Pick an owner for externally-set media: keep a live owner, otherwise
    /// the first registered claiming player bound to the same source.
    fn resolve_owner(&mut self) {
        let Some(source) = self.current.as_ref().map(|media| media.source_uri.clone()) else {
            self.owner = None;
            return;
        };
        let handles = self.live_handles();
        if let Some(owner) = self.owner {
            if handles.iter().any(|(key, _)| *key == owner) {
                return;
            }
        }
        self.owner = handles
            .iter()
            .find(|(_, handle)| handle.claims_current() && handle.source_uri() == source)
            .map(|(key, _)| *key);
    }
}

/// Process-wide playback state shared by every player.
#[derive(Clone)]
pub struct PlaybackRegistry {
    inner: Rc<RefCell<RegistryInner>>,
}

impl Default for PlaybackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackRegistry {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(RegistryInner::new())),
        }
    }

    pub fn current(&self) -> Option<CurrentMedia> {
        self.inner.borrow().current.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.inner.borrow().playing
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.inner.borrow().snapshot()
    }

    /// Anchor of the current media, if any.
    pub fn anchor(&self) -> Option<String> {
        self.inner
            .borrow()
            .current
            .as_ref()
            .and_then(|media| media.anchor_id.clone())
    }

    /// Replace the current media. Clearing it also clears the playing flag.
    pub fn set_current(&self, media: Option<CurrentMedia>) {
        {
            let mut inner = self.inner.borrow_mut();
            let same_source = match (&inner.current, &media) {
                (Some(old), Some(new)) => old.same_source(new),
                _ => false,
            };
            if !same_source {
                inner.owner = None;
            }
            if media.is_none() {
                inner.playing = false;
            }
            debug!(
                source = media.as_ref().map(|m| m.source_uri.as_str()),
                "playback registry: current media set"
            );
            inner.current = media;
            inner.bump();
        }
        self.notify();
    }

    /// Set the playing flag. Raising it with no current media is ignored.
    pub fn set_playing(&self, playing: bool) {
        {
            let mut inner = self.inner.borrow_mut();
            if playing && inner.current.is_none() {
                debug!("playback registry: ignoring playing=true without current media");
                return;
            }
            if inner.playing == playing {
                return;
            }
            inner.playing = playing;
            inner.bump();
        }
        self.notify();
    }

    /// Make `media` current on behalf of `key`.
    ///
    /// Every other engine that is playing is paused before this returns, so the
    /// caller may start its own engine immediately afterwards.
    pub fn claim(&self, key: PlayerKey, media: CurrentMedia) {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            let changed = inner.owner != Some(key) || inner.current.as_ref() != Some(&media);
            if changed {
                debug!(%key, source = %media.source_uri, "playback registry: claimed");
                inner.current = Some(media);
                inner.owner = Some(key);
                inner.bump();
            }
            changed
        };
        self.pause_others(key);
        if changed {
            self.notify();
        }
    }

    /// Pause every playing engine except `key`'s without touching current.
    pub fn silence_others(&self, key: PlayerKey) {
        self.pause_others(key);
    }

    /// Stop every registered engine and clear current. Safe to call at any time.
    pub fn stop_all(&self) {
        let handles = self.inner.borrow_mut().live_handles();
        for (key, handle) in handles {
            if let Err(err) = handle.stop_engine() {
                warn!(%key, error = %err, "playback registry: failed to stop player");
            }
        }

        let changed = {
            let mut inner = self.inner.borrow_mut();
            let changed = inner.current.is_some() || inner.playing || inner.owner.is_some();
            inner.current = None;
            inner.playing = false;
            inner.owner = None;
            if changed {
                inner.bump();
            }
            changed
        };
        if changed {
            debug!("playback registry: stopped all playback");
            self.notify();
        }
    }

    /// Reserve a key for a player about to register.
    pub fn allocate_key(&self) -> PlayerKey {
        let mut inner = self.inner.borrow_mut();
        let key = PlayerKey(inner.next_key);
        inner.next_key += 1;
        key
    }

    pub fn register(&self, key: PlayerKey, handle: Weak<dyn PlaybackHandle>) {
        let mut inner = self.inner.borrow_mut();
        inner.handles.retain(|entry| entry.key != key);
        inner.handles.push(Registration { key, handle });
        inner.resolve_owner();
        trace!(%key, count = inner.handles.len(), "playback registry: registered");
    }

    pub fn unregister(&self, key: PlayerKey) {
        let mut inner = self.inner.borrow_mut();
        inner.handles.retain(|entry| entry.key != key);
        if inner.owner == Some(key) {
            inner.owner = None;
        }
        trace!(%key, count = inner.handles.len(), "playback registry: unregistered");
    }

    /// Number of live registered players.
    pub fn registered_count(&self) -> usize {
        self.inner.borrow_mut().live_handles().len()
    }

    /// Call `observer` with every new snapshot until the returned
    /// [`Subscription`] is dropped.
    pub fn subscribe(&self, observer: impl Fn(&PlaybackSnapshot) + 'static) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_observer;
        inner.next_observer += 1;
        let alive = Rc::new(Cell::new(true));
        inner.observers.push(Observer {
            id,
            alive: alive.clone(),
            callback: Rc::new(observer),
        });
        Subscription {
            registry: Rc::downgrade(&self.inner),
            id,
            alive,
        }
    }

    fn pause_others(&self, key: PlayerKey) {
        let handles = self.inner.borrow_mut().live_handles();
        for (other, handle) in handles {
            if other == key || !handle.is_engine_playing() {
                continue;
            }
            if let Err(err) = handle.pause_engine() {
                warn!(key = %other, error = %err, "playback registry: failed to pause player");
            }
        }
    }

    /// Reconcile every player, then inform observers.
    ///
    /// No borrow is held while handles or observers run; if one of them
    /// changes the registry, the nested pass supersedes this one.
    fn notify(&self) {
        let (snapshot, handles, observers) = {
            let mut inner = self.inner.borrow_mut();
            inner.resolve_owner();
            let handles = inner.live_handles();
            inner.observers.retain(|observer| observer.alive.get());
            let observers: Vec<(Rc<Cell<bool>>, ObserverFn)> = inner
                .observers
                .iter()
                .map(|observer| (observer.alive.clone(), observer.callback.clone()))
                .collect();
            (inner.snapshot(), handles, observers)
        };

        for (_, handle) in handles {
            if self.inner.borrow().revision != snapshot.revision {
                trace!("playback registry: reconcile pass superseded");
                return;
            }
            handle.reconcile(&snapshot);
        }
        for (alive, observer) in observers {
            if self.inner.borrow().revision != snapshot.revision {
                return;
            }
            // Unsubscribed earlier in this pass.
            if !alive.get() {
                continue;
            }
            observer(&snapshot);
        }
    }
}

/// Keeps a registry observer alive; unsubscribes on drop.
///
/// If the registry is busy when the subscription drops, the observer is
/// only marked dead and the next notification pass prunes it.
pub struct Subscription {
    registry: Weak<RefCell<RegistryInner>>,
    id: u64,
    alive: Rc<Cell<bool>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.alive.set(false);
        if let Some(inner) = self.registry.upgrade() {
            if let Ok(mut inner) = inner.try_borrow_mut() {
                inner.observers.retain(|observer| observer.id != self.id);
            }
        }
    }
}
