//! Registry context for the component tree.

use std::rc::Rc;

use dioxus::core::{Runtime, RuntimeGuard};
use dioxus::prelude::*;

use crate::playback::{MediaResolver, PlaybackRegistry, PlaybackSnapshot};

/// Mirror of the registry state that components can subscribe to.
#[derive(Clone, Copy)]
pub struct PlaybackSnapshotSignal(pub Signal<PlaybackSnapshot>);

/// Provides one [`PlaybackRegistry`] to everything below it.
#[component]
pub fn PlaybackProvider(children: Element) -> Element {
    let registry = use_context_provider(PlaybackRegistry::new);
    let snapshot = use_signal(|| registry.snapshot());
    use_context_provider(|| PlaybackSnapshotSignal(snapshot));

    // Engine callbacks fire outside the Dioxus runtime, so the observer
    // re-enters it before writing the signal.
    let _subscription = use_hook(|| {
        let runtime = Runtime::current();
        Rc::new(registry.subscribe(move |next: &PlaybackSnapshot| {
            let _guard = RuntimeGuard::new(runtime.clone());
            let mut snapshot = snapshot;
            snapshot.set(next.clone());
        }))
    });

    rsx! {
        {children}
    }
}

pub fn use_playback_registry() -> PlaybackRegistry {
    use_context::<PlaybackRegistry>()
}

/// Current media and playing flag; re-renders the caller on every change.
pub fn use_playback_snapshot() -> PlaybackSnapshot {
    let snapshot = use_context::<PlaybackSnapshotSignal>().0;
    snapshot()
}

/// Stops every player. For modals and other view changes the navigation
/// guard cannot see.
pub fn use_stop_all_audio() -> impl Fn() + Clone + 'static {
    let registry = use_playback_registry();
    move || registry.stop_all()
}

/// Resolver bound to the page origin, so same-origin recordings skip the proxy.
pub(crate) fn page_resolver() -> MediaResolver {
    match page_origin() {
        Some(origin) => MediaResolver::default().with_origin(origin),
        None => MediaResolver::default(),
    }
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn page_origin() -> Option<String> {
    web_sys::window().and_then(|w| w.location().origin().ok())
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn page_origin() -> Option<String> {
    None
}
