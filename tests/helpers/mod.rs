//! Shared fixtures for the playback integration tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use calldesk::playback::{
    EngineError, EngineEvent, EngineResult, EventSink, PlaybackRegistry, PlayerAdapter,
    PlayerBuilder, PlayerOptions, PlayerRole, TransportEngine,
};

#[derive(Default)]
struct FakeState {
    url: String,
    sink: Option<EventSink>,
    loaded: bool,
    playing: bool,
    position: f64,
    duration: f64,
    destroyed: bool,
    play_calls: usize,
    pause_calls: usize,
    fail_commands: bool,
    queued: VecDeque<EngineEvent>,
    journal: Option<(String, Journal)>,
}

/// Ordered record of engine commands across several engines.
pub type Journal = Rc<RefCell<Vec<String>>>;

impl FakeState {
    fn record(&self, command: &str) {
        if let Some((name, journal)) = &self.journal {
            journal.borrow_mut().push(format!("{name}:{command}"));
        }
    }
}

/// Scriptable engine. Commands change state immediately, like a media
/// element, while their events queue until [`FakeEngine::flush`].
#[derive(Clone, Default)]
pub struct FakeEngine {
    state: Rc<RefCell<FakeState>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine that logs `name:play` / `name:pause` into `journal`.
    pub fn journaled(name: &str, journal: &Journal) -> Self {
        let engine = Self::default();
        engine.state.borrow_mut().journal = Some((name.to_string(), journal.clone()));
        engine
    }

    /// Factory for [`PlayerBuilder::mount`] that hands
    /// out this engine.
    pub fn factory(&self) -> impl FnOnce(&str, EventSink) -> FakeEngine {
        let engine = self.clone();
        move |url: &str, sink: EventSink| {
            {
                let mut state = engine.state.borrow_mut();
                state.url = url.to_string();
                state.sink = Some(sink);
            }
            engine
        }
    }

    fn emit(&self, event: EngineEvent) {
        let sink = self.state.borrow().sink.clone();
        if let Some(sink) = sink {
            sink.emit(event);
        }
    }

    /// Deliver queued events one at a time, including events raised while
    /// delivering.
    pub fn flush(&self) {
        loop {
            let next = self.state.borrow_mut().queued.pop_front();
            match next {
                Some(event) => self.emit(event),
                None => break,
            }
        }
    }

    pub fn ready(&self, duration: f64) {
        self.state.borrow_mut().duration = duration;
        self.emit(EngineEvent::Ready { duration });
    }

    pub fn fail(&self, message: &str) {
        self.emit(EngineEvent::Error(message.to_string()));
    }

    /// Playback reached the end.
    pub fn finish(&self) {
        {
            let mut state = self.state.borrow_mut();
            state.playing = false;
            state.position = state.duration;
        }
        self.emit(EngineEvent::Finish);
    }

    /// Queue an event without touching engine state.
    pub fn queue(&self, event: EngineEvent) {
        self.state.borrow_mut().queued.push_back(event);
    }

    pub fn set_position(&self, seconds: f64) {
        self.state.borrow_mut().position = seconds;
    }

    pub fn fail_commands(&self, fail: bool) {
        self.state.borrow_mut().fail_commands = fail;
    }

    pub fn url(&self) -> String {
        self.state.borrow().url.clone()
    }

    pub fn playing(&self) -> bool {
        self.state.borrow().playing
    }

    pub fn position(&self) -> f64 {
        self.state.borrow().position
    }

    pub fn destroyed(&self) -> bool {
        self.state.borrow().destroyed
    }

    pub fn loaded(&self) -> bool {
        self.state.borrow().loaded
    }

    pub fn play_calls(&self) -> usize {
        self.state.borrow().play_calls
    }

    pub fn pause_calls(&self) -> usize {
        self.state.borrow().pause_calls
    }
}

impl TransportEngine for FakeEngine {
    fn load(&self) {
        self.state.borrow_mut().loaded = true;
    }

    fn play(&self) -> EngineResult<()> {
        let mut state = self.state.borrow_mut();
        if state.destroyed {
            return Err(EngineError::Destroyed);
        }
        if state.fail_commands {
            return Err(EngineError::command("play", "scripted failure"));
        }
        state.play_calls += 1;
        state.record("play");
        if !state.playing {
            state.playing = true;
            state.queued.push_back(EngineEvent::Play);
        }
        Ok(())
    }

    fn pause(&self) -> EngineResult<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_commands {
            return Err(EngineError::command("pause", "scripted failure"));
        }
        state.pause_calls += 1;
        state.record("pause");
        if state.playing {
            state.playing = false;
            state.queued.push_back(EngineEvent::Pause);
        }
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.state.borrow().playing
    }

    fn seek_to(&self, seconds: f64) -> EngineResult<()> {
        let mut state = self.state.borrow_mut();
        if state.destroyed {
            return Err(EngineError::Destroyed);
        }
        state.position = seconds;
        state.queued.push_back(EngineEvent::TimeUpdate(seconds));
        Ok(())
    }

    fn duration(&self) -> f64 {
        self.state.borrow().duration
    }

    fn current_time(&self) -> f64 {
        self.state.borrow().position
    }

    fn destroy(&self) {
        let mut state = self.state.borrow_mut();
        state.destroyed = true;
        state.playing = false;
        state.queued.clear();
        state.sink = None;
    }
}

/// A mounted player plus the engine that backs it.
pub struct TestPlayer {
    pub adapter: PlayerAdapter<FakeEngine>,
    pub engine: FakeEngine,
}

impl TestPlayer {
    pub fn toggle(&self) {
        self.adapter.toggle();
        self.engine.flush();
    }

    pub fn is_playing(&self) -> bool {
        self.engine.playing()
    }
}

/// Mount a player for `source` and bring it to the ready state.
pub fn mount_ready(registry: &PlaybackRegistry, source: &str, options: PlayerOptions) -> TestPlayer {
    mount_ready_with(registry, source, options, FakeEngine::new())
}

pub fn mount_ready_with(
    registry: &PlaybackRegistry,
    source: &str,
    options: PlayerOptions,
    engine: FakeEngine,
) -> TestPlayer {
    let adapter = PlayerBuilder::new(registry, source)
        .options(options)
        .mount(engine.factory());
    engine.ready(60.0);
    TestPlayer { adapter, engine }
}

pub fn claiming(label: &str) -> PlayerOptions {
    PlayerOptions::default()
        .with_label(label)
        .with_anchor(format!("row-{label}"))
}

pub fn with_role(role: PlayerRole) -> PlayerOptions {
    PlayerOptions::default().with_role(role)
}

/// Flush every engine until none has queued events left.
pub fn settle(players: &[&TestPlayer]) {
    for _ in 0..8 {
        for player in players {
            player.engine.flush();
        }
    }
}
