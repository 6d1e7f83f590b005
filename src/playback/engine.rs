//! Transport engine seam.
//!
//! A transport engine decodes and plays exactly one audio resource. Engines
//! report what actually happened through [`EngineEvent`]s sent to the
//! [`EventSink`] they were created with; adapters never assume a command took
//! effect until the matching event arrives.

use std::rc::Weak;

use thiserror::Error;

/// Events an engine reports back to its owning adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Metadata is available and controls may be enabled.
    Ready { duration: f64 },
    /// Fetch or decode failed. The message is shown to the user as-is.
    Error(String),
    Play,
    Pause,
    Finish,
    /// Playback position moved, either by playing or by a seek.
    TimeUpdate(f64),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Engine has been destroyed")]
    Destroyed,

    #[error("Audio playback is not supported on this platform")]
    Unsupported,

    #[error("Failed to {action}: {reason}")]
    Command {
        action: &'static str,
        reason: String,
    },
}

impl EngineError {
    pub fn command(action: &'static str, reason: impl Into<String>) -> Self {
        Self::Command {
            action,
            reason: reason.into(),
        }
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Commands an adapter issues to its engine.
///
/// Methods take `&self`: engines are driven from UI callbacks and keep their
/// own interior state.
pub trait TransportEngine {
    /// Begin fetching the resource bound at construction.
    fn load(&self);

    fn play(&self) -> EngineResult<()>;

    fn pause(&self) -> EngineResult<()>;

    /// Live query of the underlying transport; never a remembered flag.
    fn is_playing(&self) -> bool;

    fn seek_to(&self, seconds: f64) -> EngineResult<()>;

    fn duration(&self) -> f64;

    fn current_time(&self) -> f64;

    /// Release every underlying audio resource. Later commands fail with
    /// [`EngineError::Destroyed`].
    fn destroy(&self);
}

/// Receiver side of engine events.
pub trait EngineListener {
    fn on_engine_event(&self, event: EngineEvent);
}

/// Handle an engine uses to report events to its adapter.
///
/// Holds a weak reference, so events emitted after the adapter is gone are
/// dropped.
#[derive(Clone)]
pub struct EventSink {
    target: Weak<dyn EngineListener>,
}

impl EventSink {
    pub fn new(target: Weak<dyn EngineListener>) -> Self {
        Self { target }
    }

    pub fn emit(&self, event: EngineEvent) {
        match self.target.upgrade() {
            Some(listener) => listener.on_engine_event(event),
            None => tracing::trace!(?event, "dropping engine event for released player"),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.target.strong_count() > 0
    }
}

/// Engine used where no browser audio stack exists.
///
/// Reports an error as soon as loading starts so the player renders with
/// disabled controls instead of spinning forever.
pub struct UnsupportedEngine {
    events: EventSink,
}

impl UnsupportedEngine {
    pub fn new(_url: &str, events: EventSink) -> Self {
        Self { events }
    }
}

impl TransportEngine for UnsupportedEngine {
    fn load(&self) {
        self.events
            .emit(EngineEvent::Error(EngineError::Unsupported.to_string()));
    }

    fn play(&self) -> EngineResult<()> {
        Err(EngineError::Unsupported)
    }

    fn pause(&self) -> EngineResult<()> {
        Ok(())
    }

    fn is_playing(&self) -> bool {
        false
    }

    fn seek_to(&self, _seconds: f64) -> EngineResult<()> {
        Err(EngineError::Unsupported)
    }

    fn duration(&self) -> f64 {
        0.0
    }

    fn current_time(&self) -> f64 {
        0.0
    }

    fn destroy(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder(RefCell<Vec<EngineEvent>>);

    impl EngineListener for Recorder {
        fn on_engine_event(&self, event: EngineEvent) {
            self.0.borrow_mut().push(event);
        }
    }

    #[test]
    fn sink_drops_events_after_listener_is_gone() {
        let recorder = Rc::new(Recorder(RefCell::new(Vec::new())));
        let weak: Weak<dyn EngineListener> = Rc::downgrade(&recorder) as Weak<dyn EngineListener>;
        let sink = EventSink::new(weak);

        sink.emit(EngineEvent::Play);
        assert_eq!(recorder.0.borrow().as_slice(), &[EngineEvent::Play]);

        drop(recorder);
        assert!(!sink.is_attached());
        sink.emit(EngineEvent::Pause);
    }

    #[test]
    fn unsupported_engine_reports_error_on_load() {
        let recorder = Rc::new(Recorder(RefCell::new(Vec::new())));
        let weak: Weak<dyn EngineListener> = Rc::downgrade(&recorder) as Weak<dyn EngineListener>;
        let engine = UnsupportedEngine::new("/a.mp3", EventSink::new(weak));

        engine.load();
        assert!(matches!(
            recorder.0.borrow().first(),
            Some(EngineEvent::Error(message)) if message.contains("not supported")
        ));
        assert_eq!(engine.play(), Err(EngineError::Unsupported));
        assert!(!engine.is_playing());
    }
}
