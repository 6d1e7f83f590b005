use std::rc::Rc;

use dioxus::prelude::*;

use crate::components::{page_origin, use_playback_registry, AppView};
use crate::navigation::NavigationWatcher;
#[cfg(target_arch = "wasm32")]
use crate::navigation::install_browser_listeners;

#[cfg(target_arch = "wasm32")]
fn initial_location(_route: &AppView) -> String {
    crate::navigation::current_location()
}

#[cfg(not(target_arch = "wasm32"))]
fn initial_location(route: &AppView) -> String {
    route.to_string()
}

#[cfg(target_arch = "wasm32")]
fn observe(watcher: &NavigationWatcher, route: &str) {
    watcher.observe_route_at(route, &crate::navigation::current_location());
}

#[cfg(not(target_arch = "wasm32"))]
fn observe(watcher: &NavigationWatcher, route: &str) {
    watcher.observe_route(route);
}

/// Stops all playback whenever the user leaves the current view.
///
/// Renders nothing. Must sit inside the router so it sees every route change.
#[component]
pub fn NavigationGuard() -> Element {
    let registry = use_playback_registry();
    let route = use_route::<AppView>();

    let watcher = use_hook(|| {
        let watcher = NavigationWatcher::for_registry(registry.clone(), initial_location(&route));
        Rc::new(match page_origin() {
            Some(origin) => watcher.with_origin(origin),
            None => watcher,
        })
    });

    // Dropped with the guard, which detaches every listener.
    #[cfg(target_arch = "wasm32")]
    let _listeners = use_hook({
        let watcher = watcher.clone();
        move || Rc::new(install_browser_listeners(watcher))
    });

    // After render: a route change stops every player, which writes signals.
    let route_key = route.to_string();
    use_effect(use_reactive((&route_key,), move |(route_key,)| {
        observe(&watcher, &route_key)
    }));

    rsx! {}
}
