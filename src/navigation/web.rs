// Browser wiring: feeds DOM events and the polling timer into a watcher.
use std::rc::Rc;

use gloo_timers::callback::{Interval, Timeout};
use tracing::warn;
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{window, Element, Event, EventTarget};

use super::{ClickDisposition, ClickedElement, NavigationWatcher, NAVIGATION_MARKER};

const MAX_CLICK_DEPTH: usize = 32;

struct Registration {
    target: EventTarget,
    name: &'static str,
    capture: bool,
    closure: Closure<dyn FnMut(Event)>,
}

/// Listeners installed for one watcher. Dropping removes them and stops polling.
pub struct BrowserListeners {
    registrations: Vec<Registration>,
    _poll: Interval,
}

impl Drop for BrowserListeners {
    fn drop(&mut self) {
        for registration in self.registrations.drain(..) {
            let _ = registration
                .target
                .remove_event_listener_with_callback_and_bool(
                    registration.name,
                    registration.closure.as_ref().unchecked_ref(),
                    registration.capture,
                );
        }
    }
}

/// Current `pathname + search`.
pub(crate) fn current_location() -> String {
    window()
        .map(|w| w.location())
        .map(|location| {
            format!(
                "{}{}",
                location.pathname().unwrap_or_default(),
                location.search().unwrap_or_default()
            )
        })
        .unwrap_or_default()
}

fn current_pathname() -> String {
    window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

fn click_path(event: &Event) -> Vec<ClickedElement> {
    let mut path = Vec::new();
    let mut current = event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok());
    while let Some(element) = current {
        if path.len() >= MAX_CLICK_DEPTH {
            break;
        }
        path.push(ClickedElement {
            tag: element.tag_name().to_ascii_lowercase(),
            href: element.get_attribute("href"),
            navigation_marker: element.get_attribute(NAVIGATION_MARKER),
        });
        current = element.parent_element();
    }
    path
}

/// Attach every abandonment signal to `watcher`.
pub fn install_browser_listeners(watcher: Rc<NavigationWatcher>) -> Option<BrowserListeners> {
    let win = window()?;
    let doc = win.document()?;
    let win_target: EventTarget = win.clone().into();
    let doc_target: EventTarget = doc.clone().into();
    let mut registrations = Vec::new();

    let mut listen = |target: &EventTarget,
                      name: &'static str,
                      capture: bool,
                      handler: Box<dyn FnMut(Event)>| {
        let closure = Closure::wrap(handler);
        match target.add_event_listener_with_callback_and_bool(
            name,
            closure.as_ref().unchecked_ref(),
            capture,
        ) {
            Ok(()) => registrations.push(Registration {
                target: target.clone(),
                name,
                capture,
                closure,
            }),
            Err(err) => warn!(event = name, ?err, "navigation watcher: failed to attach listener"),
        }
    };

    for name in ["pagehide", "beforeunload"] {
        let watcher = watcher.clone();
        listen(&win_target, name, false, Box::new(move |_: Event| watcher.page_unload()));
    }
    {
        let watcher = watcher.clone();
        let doc = doc.clone();
        listen(
            &doc_target,
            "visibilitychange",
            false,
            Box::new(move |_: Event| watcher.visibility_changed(doc.hidden())),
        );
    }
    {
        let watcher = watcher.clone();
        listen(&win_target, "blur", false, Box::new(move |_: Event| watcher.window_blurred()));
    }
    {
        let watcher = watcher.clone();
        listen(
            &win_target,
            "focus",
            false,
            Box::new(move |_: Event| watcher.window_focused(&current_location())),
        );
    }
    {
        let watcher = watcher.clone();
        listen(
            &doc_target,
            "click",
            true,
            Box::new(move |event: Event| {
                let path = click_path(&event);
                let disposition = watcher.click_at(&path, &current_pathname(), &current_location());
                if disposition == ClickDisposition::Deferred {
                    let watcher = watcher.clone();
                    let grace = watcher.config().click_grace.as_millis() as u32;
                    Timeout::new(grace, move || watcher.deferred_check(&current_location()))
                        .forget();
                }
            }),
        );
    }
    {
        let watcher = watcher.clone();
        listen(&doc_target, "mouseup", false, Box::new(move |_: Event| watcher.pointer_released()));
    }
    {
        let watcher = watcher.clone();
        listen(&doc_target, "keyup", false, Box::new(move |_: Event| watcher.key_released()));
    }
    {
        let watcher = watcher.clone();
        listen(&win_target, "popstate", false, Box::new(move |_: Event| watcher.history_popped()));
    }

    let poll = {
        let watcher = watcher.clone();
        let every = watcher.config().poll_interval.as_millis() as u32;
        Interval::new(every, move || watcher.poll(&current_location()))
    };

    Some(BrowserListeners {
        registrations,
        _poll: poll,
    })
}
