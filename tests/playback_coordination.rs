//! Integration tests for single-active-media playback across several players.

mod helpers;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use calldesk::navigation::{ClickDisposition, ClickedElement, NavigationWatcher};
use calldesk::playback::{
    AnchorScroller, CurrentMedia, EngineEvent, PlaybackRegistry, PlayerBuilder, PlayerRole,
    ScrollAnchor, TransportEngine,
};
use helpers::{claiming, mount_ready, mount_ready_with, settle, with_role, FakeEngine, Journal};

const CALL_A: &str = "https://recordings.example.com/calls/1042.mp3";
const CALL_B: &str = "https://recordings.example.com/calls/1043.mp3";
const LOCAL: &str = "/media/calls/1044.mp3";

#[test]
fn at_most_one_engine_plays_across_toggles() {
    let registry = PlaybackRegistry::new();
    let a = mount_ready(&registry, CALL_A, claiming("a"));
    let b = mount_ready(&registry, CALL_B, claiming("b"));
    let c = mount_ready(&registry, LOCAL, claiming("c"));
    let players = [&a, &b, &c];

    let sequence = [&a, &b, &b, &c, &a, &c, &b, &a, &a];
    for player in sequence {
        player.toggle();
        settle(&players);
        let audible = players.iter().filter(|p| p.is_playing()).count();
        assert!(audible <= 1, "{audible} engines playing at once");
    }
}

#[test]
fn other_engine_pauses_before_claimer_starts() {
    let journal: Journal = Rc::new(RefCell::new(Vec::new()));
    let registry = PlaybackRegistry::new();
    let a = mount_ready_with(&registry, CALL_A, claiming("a"), FakeEngine::journaled("a", &journal));
    let b = mount_ready_with(&registry, CALL_B, claiming("b"), FakeEngine::journaled("b", &journal));

    a.toggle();
    assert!(a.is_playing());
    journal.borrow_mut().clear();

    // No flushing: both effects must happen inside the one toggle call.
    b.adapter.toggle();
    assert!(!a.is_playing());
    assert!(b.is_playing());

    let log = journal.borrow();
    let paused_a = log.iter().position(|entry| entry == "a:pause");
    let played_b = log.iter().position(|entry| entry == "b:play");
    assert!(paused_a.is_some() && played_b.is_some(), "journal: {log:?}");
    assert!(paused_a < played_b, "journal: {log:?}");
}

#[test]
fn current_follows_the_last_claimer() {
    let registry = PlaybackRegistry::new();
    let a = mount_ready(&registry, CALL_A, claiming("a"));
    let b = mount_ready(&registry, CALL_B, claiming("b"));

    a.toggle();
    assert_eq!(registry.current().map(|m| m.source_uri), Some(CALL_A.to_string()));
    assert!(registry.is_playing());

    b.toggle();
    settle(&[&a, &b]);
    assert_eq!(registry.current().map(|m| m.source_uri), Some(CALL_B.to_string()));
    assert!(registry.is_playing());
    assert!(!a.adapter.state().is_playing);
    assert!(b.adapter.state().is_playing);

    b.toggle();
    settle(&[&a, &b]);
    assert!(!registry.is_playing());
    assert_eq!(registry.current().map(|m| m.source_uri), Some(CALL_B.to_string()));
}

#[test]
fn stop_all_is_idempotent() {
    let registry = PlaybackRegistry::new();
    let a = mount_ready(&registry, CALL_A, claiming("a"));
    a.toggle();

    let notifications = Rc::new(Cell::new(0));
    let counter = notifications.clone();
    let _subscription = registry.subscribe(move |_| counter.set(counter.get() + 1));

    registry.stop_all();
    a.engine.flush();
    let after_first = notifications.get();
    let pauses_after_first = a.engine.pause_calls();
    assert!(after_first >= 1);

    registry.stop_all();
    registry.stop_all();
    a.engine.flush();
    assert_eq!(notifications.get(), after_first);
    assert_eq!(a.engine.pause_calls(), pauses_after_first);
    assert_eq!(registry.current(), None);
    assert!(!registry.is_playing());
}

#[test]
fn stop_all_pauses_every_registered_engine() {
    let registry = PlaybackRegistry::new();
    let a = mount_ready(&registry, CALL_A, claiming("a"));
    let preview = mount_ready(&registry, LOCAL, with_role(PlayerRole::NonClaiming));

    a.toggle();
    preview.toggle();
    // Restart the first engine behind the adapter, as autoplay would.
    a.engine.play().expect("fake engine plays");
    assert!(a.is_playing() && preview.is_playing());

    registry.stop_all();
    assert!(!a.is_playing());
    assert!(!preview.is_playing());
    assert_eq!(registry.current(), None);
    assert!(!registry.is_playing());

    settle(&[&a, &preview]);
    assert!(!a.adapter.state().is_playing);
    assert!(!preview.adapter.state().is_playing);
}

#[test]
fn stop_all_continues_past_a_failing_engine() {
    let registry = PlaybackRegistry::new();
    let broken = mount_ready(&registry, CALL_A, claiming("broken"));
    let healthy = mount_ready(&registry, CALL_B, with_role(PlayerRole::NonClaiming));

    broken.toggle();
    healthy.engine.play().expect("fake engine plays");
    broken.engine.fail_commands(true);

    registry.stop_all();
    assert!(broken.is_playing());
    assert!(!healthy.is_playing());
    assert_eq!(registry.current(), None);
}

#[test]
fn finish_rewinds_and_clears_current() {
    let registry = PlaybackRegistry::new();
    let a = mount_ready(&registry, CALL_A, claiming("a"));
    a.toggle();
    a.engine.set_position(59.0);
    a.engine.finish();
    a.engine.flush();

    assert_eq!(a.engine.position(), 0.0);
    assert_eq!(a.adapter.state().position, 0.0);
    assert!(!a.adapter.state().is_playing);
    assert_eq!(registry.current(), None);
    assert!(!registry.is_playing());
}

#[test]
fn header_finish_keeps_current() {
    let registry = PlaybackRegistry::new();
    let header = mount_ready(&registry, CALL_A, with_role(PlayerRole::Header));
    registry.set_current(Some(CurrentMedia::new(CALL_A)));

    header.toggle();
    header.engine.finish();
    header.engine.flush();

    assert_eq!(registry.current().map(|m| m.source_uri), Some(CALL_A.to_string()));
    assert!(!registry.is_playing());
    assert_eq!(header.adapter.state().position, 0.0);
}

#[test]
fn non_claiming_players_never_set_current() {
    let registry = PlaybackRegistry::new();
    let header = mount_ready(&registry, CALL_A, with_role(PlayerRole::Header));
    let preview = mount_ready(&registry, CALL_B, with_role(PlayerRole::NonClaiming));

    header.toggle();
    assert!(header.is_playing());
    assert_eq!(registry.current(), None);

    preview.toggle();
    settle(&[&header, &preview]);
    assert!(preview.is_playing());
    assert!(!header.is_playing());
    assert_eq!(registry.current(), None);
    assert!(!registry.is_playing());
}

#[test]
fn non_claiming_preview_silences_the_current_media() {
    let registry = PlaybackRegistry::new();
    let a = mount_ready(&registry, CALL_A, claiming("a"));
    let preview = mount_ready(&registry, LOCAL, with_role(PlayerRole::NonClaiming));

    a.toggle();
    preview.toggle();
    settle(&[&a, &preview]);

    assert!(preview.is_playing());
    assert!(!a.is_playing());
    assert_eq!(registry.current().map(|m| m.source_uri), Some(CALL_A.to_string()));
    assert!(!registry.is_playing());
}

#[test]
fn header_on_the_current_recording_plays_itself() {
    let registry = PlaybackRegistry::new();
    let main = mount_ready(&registry, CALL_A, claiming("main"));
    let header = mount_ready(&registry, CALL_A, with_role(PlayerRole::Header));
    let players = [&main, &header];

    main.toggle();
    main.toggle();
    settle(&players);
    assert!(!main.is_playing());

    header.toggle();
    settle(&players);
    assert!(header.is_playing());
    assert!(header.adapter.state().is_playing);
    assert!(!main.is_playing());
    assert!(!registry.is_playing());
    assert_eq!(registry.current().map(|m| m.source_uri), Some(CALL_A.to_string()));
}

#[test]
fn header_and_owner_hand_the_recording_back_and_forth() {
    let registry = PlaybackRegistry::new();
    let main = mount_ready(&registry, CALL_A, claiming("main"));
    let header = mount_ready(&registry, CALL_A, with_role(PlayerRole::Header));
    let players = [&main, &header];

    main.toggle();
    header.toggle();
    settle(&players);
    assert!(header.is_playing());
    assert!(!main.is_playing());
    assert!(!main.adapter.state().is_playing);
    assert!(!registry.is_playing());

    main.toggle();
    settle(&players);
    assert!(main.is_playing());
    assert!(!header.is_playing());
    assert!(!header.adapter.state().is_playing);
    assert!(registry.is_playing());

    header.toggle();
    settle(&players);
    header.toggle();
    settle(&players);
    assert!(!header.is_playing());
    assert!(!main.is_playing());
    assert!(!registry.is_playing());
}

#[test]
fn header_finish_on_the_current_recording_keeps_current() {
    let registry = PlaybackRegistry::new();
    let main = mount_ready(&registry, CALL_A, claiming("main"));
    let header = mount_ready(&registry, CALL_A, with_role(PlayerRole::Header));

    main.toggle();
    header.toggle();
    settle(&[&main, &header]);
    header.engine.finish();
    settle(&[&main, &header]);

    assert_eq!(registry.current().map(|m| m.source_uri), Some(CALL_A.to_string()));
    assert!(!registry.is_playing());
    assert!(!main.is_playing());
    assert_eq!(header.adapter.state().position, 0.0);
}

#[test]
fn preview_of_the_current_recording_plays_and_clears_on_finish() {
    let registry = PlaybackRegistry::new();
    let main = mount_ready(&registry, CALL_A, claiming("main"));
    let preview = mount_ready(&registry, CALL_A, with_role(PlayerRole::NonClaiming));
    let players = [&main, &preview];

    main.toggle();
    preview.toggle();
    settle(&players);
    assert!(preview.is_playing());
    assert!(!main.is_playing());
    assert!(!registry.is_playing());

    preview.toggle();
    settle(&players);
    assert!(!preview.is_playing());
    assert!(!main.is_playing());

    preview.toggle();
    settle(&players);
    preview.engine.finish();
    settle(&players);
    assert_eq!(registry.current(), None);
    assert!(!main.is_playing());
    assert_eq!(preview.adapter.state().position, 0.0);
}

#[test]
fn same_recording_in_two_rows_plays_once() {
    let registry = PlaybackRegistry::new();
    let row = mount_ready(&registry, CALL_A, claiming("row"));
    let detail = mount_ready(&registry, CALL_A, claiming("detail"));

    row.toggle();
    settle(&[&row, &detail]);
    assert!(row.is_playing());
    assert!(!detail.is_playing());

    detail.toggle();
    settle(&[&row, &detail]);
    assert!(detail.is_playing());
    assert!(!row.is_playing());
}

#[test]
fn unmount_pauses_destroys_and_unregisters() {
    let registry = PlaybackRegistry::new();
    let a = mount_ready(&registry, CALL_A, claiming("a"));
    let b = mount_ready(&registry, CALL_B, claiming("b"));
    assert_eq!(registry.registered_count(), 2);

    a.toggle();
    let engine = a.engine.clone();
    drop(a);

    assert!(!engine.playing());
    assert!(engine.destroyed());
    assert_eq!(registry.registered_count(), 1);
    assert!(!registry.is_playing());

    // The surviving player still works.
    b.toggle();
    assert!(b.is_playing());
}

#[test]
fn release_is_idempotent() {
    let registry = PlaybackRegistry::new();
    let a = mount_ready(&registry, CALL_A, claiming("a"));
    a.adapter.release();
    a.adapter.release();
    assert!(a.adapter.is_released());
    assert_eq!(registry.registered_count(), 0);

    a.adapter.toggle();
    assert!(!a.is_playing());
}

#[test]
fn route_change_stops_playback() {
    let registry = PlaybackRegistry::new();
    let a = mount_ready(&registry, CALL_A, claiming("a"));
    let watcher = NavigationWatcher::for_registry(registry.clone(), "/");
    watcher.observe_route("/");

    a.toggle();
    assert!(a.is_playing());

    watcher.observe_route("/complaints");
    assert!(!a.is_playing());
    assert_eq!(registry.current(), None);
    assert_eq!(watcher.abandon_count(), 1);
}

#[test]
fn route_change_stops_every_mounted_player() {
    let registry = PlaybackRegistry::new();
    let a = mount_ready(&registry, CALL_A, claiming("a"));
    let b = mount_ready(&registry, CALL_B, claiming("b"));
    let watcher = NavigationWatcher::for_registry(registry.clone(), "/calls");
    watcher.observe_route("/calls");

    a.toggle();
    // Autoplay behind the adapter's back.
    b.engine.play().expect("fake engine plays");
    assert!(a.is_playing() && b.is_playing());

    watcher.observe_route("/complaints");
    assert!(!a.is_playing());
    assert!(!b.is_playing());
    assert_eq!(registry.current(), None);
    assert!(!registry.is_playing());

    settle(&[&a, &b]);
    assert!(!a.adapter.state().is_playing);
    assert!(!b.adapter.state().is_playing);
}

#[test]
fn playback_started_right_after_a_route_change_survives() {
    let registry = PlaybackRegistry::new();
    let a = mount_ready(&registry, CALL_A, claiming("a"));
    let watcher = NavigationWatcher::for_registry(registry.clone(), "/");
    watcher.observe_route("/");
    watcher.observe_route("/complaints");
    assert_eq!(watcher.abandon_count(), 1);

    let path = [ClickedElement::new("svg"), ClickedElement::new("button")];
    assert_eq!(watcher.click(&path, "/complaints"), ClickDisposition::Deferred);
    a.toggle();
    watcher.deferred_check("/complaints");
    watcher.poll("/complaints");

    assert!(a.is_playing());
    assert!(registry.is_playing());
    assert_eq!(watcher.abandon_count(), 1);
}

#[test]
fn navigation_click_stops_playback_synchronously() {
    let registry = PlaybackRegistry::new();
    let a = mount_ready(&registry, CALL_A, claiming("a"));
    let watcher = NavigationWatcher::for_registry(registry.clone(), "/");

    a.toggle();
    let path = [
        ClickedElement::new("span"),
        ClickedElement::anchor("/complaints"),
        ClickedElement::new("nav"),
    ];
    let disposition = watcher.click(&path, "/");

    assert_eq!(disposition, ClickDisposition::Abandoned);
    assert!(!a.is_playing());
    assert_eq!(registry.current(), None);
}

#[test]
fn clicking_the_play_button_is_not_navigation() {
    let registry = PlaybackRegistry::new();
    let a = mount_ready(&registry, CALL_A, claiming("a"));
    let watcher = NavigationWatcher::for_registry(registry.clone(), "/");

    let path = [ClickedElement::new("svg"), ClickedElement::new("button")];
    assert_eq!(watcher.click(&path, "/"), ClickDisposition::Deferred);
    a.toggle();
    watcher.deferred_check("/");

    assert!(a.is_playing());
    assert_eq!(watcher.abandon_count(), 0);
}

#[test]
fn spurious_play_event_from_idle_engine_is_ignored() {
    let registry = PlaybackRegistry::new();
    let a = mount_ready(&registry, CALL_A, claiming("a"));
    let b = mount_ready(&registry, CALL_B, claiming("b"));
    b.toggle();

    // Engine setup reports a play that never started.
    a.engine.queue(EngineEvent::Play);
    a.engine.flush();

    assert!(!a.adapter.state().is_playing);
    assert!(b.is_playing());
    assert_eq!(registry.current().map(|m| m.source_uri), Some(CALL_B.to_string()));
}

#[test]
fn controls_are_inert_until_ready_and_after_errors() {
    let registry = PlaybackRegistry::new();
    let engine = FakeEngine::new();
    let player = PlayerBuilder::new(&registry, CALL_A)
        .mount(engine.factory());

    assert!(engine.loaded());
    assert!(player.state().is_loading);
    player.toggle();
    player.seek_to(5.0);
    assert_eq!(engine.play_calls(), 0);
    assert_eq!(engine.position(), 0.0);

    engine.fail("Audio could not be decoded");
    let state = player.state();
    assert!(!state.controls_enabled());
    assert_eq!(state.error.as_deref(), Some("Audio could not be decoded"));
    player.toggle();
    assert_eq!(engine.play_calls(), 0);
    assert_eq!(registry.current(), None);
}

#[test]
fn skip_clamps_to_the_recording() {
    let registry = PlaybackRegistry::new();
    let a = mount_ready(&registry, CALL_A, claiming("a"));

    a.adapter.skip(-10.0);
    assert_eq!(a.engine.position(), 0.0);

    a.engine.set_position(55.0);
    a.adapter.skip(10.0);
    assert_eq!(a.engine.position(), 60.0);

    a.adapter.seek_fraction(0.5);
    assert_eq!(a.engine.position(), 30.0);
}

#[test]
fn absolute_sources_load_through_the_proxy() {
    let registry = PlaybackRegistry::new();
    let remote = mount_ready(&registry, CALL_A, claiming("remote"));
    let local = mount_ready(&registry, LOCAL, claiming("local"));

    assert_eq!(
        remote.engine.url(),
        "/api/audio?url=https%3A%2F%2Frecordings.example.com%2Fcalls%2F1042.mp3"
    );
    assert_eq!(local.engine.url(), LOCAL);
    assert_eq!(remote.adapter.source_uri(), CALL_A);
}

struct RecordingScroller {
    visible: Vec<&'static str>,
    pulsed: RefCell<Vec<String>>,
}

impl AnchorScroller for RecordingScroller {
    fn scroll_into_view(&self, anchor_id: &str) -> bool {
        self.visible.contains(&anchor_id)
    }

    fn pulse(&self, anchor_id: &str, _duration: std::time::Duration) {
        self.pulsed.borrow_mut().push(anchor_id.to_string());
    }
}

#[test]
fn jump_targets_the_playing_row() {
    let registry = PlaybackRegistry::new();
    let a = mount_ready(&registry, CALL_A, claiming("a"));
    let b = mount_ready(&registry, CALL_B, claiming("b"));
    let scroller = RecordingScroller {
        visible: vec!["row-a", "row-b"],
        pulsed: RefCell::new(Vec::new()),
    };
    let anchor = ScrollAnchor::new(registry.clone());

    assert!(!anchor.jump(&scroller));
    a.toggle();
    b.toggle();
    settle(&[&a, &b]);

    assert_eq!(anchor.target().as_deref(), Some("row-b"));
    assert!(anchor.jump(&scroller));
    assert_eq!(scroller.pulsed.borrow().as_slice(), &["row-b".to_string()]);
}
