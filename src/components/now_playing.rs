use dioxus::prelude::*;

use crate::components::{use_playback_registry, use_playback_snapshot, use_stop_all_audio, Icon};
use crate::playback::PlaybackRegistry;
#[cfg(target_arch = "wasm32")]
use crate::playback::{DomScroller, ScrollAnchor};

#[cfg(target_arch = "wasm32")]
fn jump_to_current(registry: &PlaybackRegistry) -> bool {
    ScrollAnchor::new(registry.clone()).jump(&DomScroller)
}

#[cfg(not(target_arch = "wasm32"))]
fn jump_to_current(_registry: &PlaybackRegistry) -> bool {
    false
}

/// Floating bar naming the current recording, with jump-to and stop.
#[component]
pub fn NowPlayingBar() -> Element {
    let registry = use_playback_registry();
    let snapshot = use_playback_snapshot();
    let stop_all = use_stop_all_audio();

    let Some(media) = snapshot.current.clone() else {
        return rsx! {};
    };
    let can_jump = snapshot.anchor().is_some();
    let status = if snapshot.playing { "Playing" } else { "Paused" };
    let label = media.display_label().to_string();
    let indicator = if snapshot.playing { "play" } else { "pause" };

    rsx! {
        div { class: "now-playing-bar fixed bottom-4 left-1/2 -translate-x-1/2 z-40 flex items-center gap-3 px-4 py-2 rounded-full bg-zinc-900/95 ring-1 ring-zinc-700 shadow-xl",
            Icon {
                name: indicator.to_string(),
                class: "w-4 h-4 text-amber-400".to_string(),
            }
            div { class: "flex flex-col min-w-0",
                span { class: "text-sm font-medium truncate", "{label}" }
                if let Some(caption) = media.caption.clone() {
                    span { class: "text-xs text-zinc-400 truncate", "{status} · {caption}" }
                } else {
                    span { class: "text-xs text-zinc-400", "{status}" }
                }
            }
            if can_jump {
                button {
                    class: "p-1.5 rounded-lg text-zinc-300 hover:text-white hover:bg-zinc-800",
                    aria_label: "Show recording",
                    onclick: move |_| {
                        jump_to_current(&registry);
                    },
                    Icon { name: "locate".to_string(), class: "w-4 h-4".to_string() }
                }
            }
            button {
                class: "p-1.5 rounded-lg text-zinc-300 hover:text-white hover:bg-zinc-800",
                aria_label: "Stop",
                onclick: move |_| stop_all(),
                Icon { name: "stop".to_string(), class: "w-4 h-4".to_string() }
            }
        }
    }
}
