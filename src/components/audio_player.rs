use std::rc::Rc;

use dioxus::core::{Runtime, RuntimeGuard};
use dioxus::prelude::*;

use crate::components::{page_resolver, use_playback_registry, use_playback_snapshot, Icon};
use crate::playback::{
    PlatformEngine, PlayerAdapter, PlayerBuilder, PlayerOptions, PlayerRole, PlayerState,
    SKIP_SECONDS,
};

/// Resolution of the progress slider.
const SEEK_STEPS: f64 = 1000.0;

pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

fn player_options(
    id: Option<String>,
    label: Option<String>,
    caption: Option<String>,
    anchor_id: Option<String>,
    header: bool,
    non_claiming: bool,
) -> PlayerOptions {
    let role = if header {
        PlayerRole::Header
    } else if non_claiming {
        PlayerRole::NonClaiming
    } else {
        PlayerRole::Claiming
    };
    PlayerOptions {
        id,
        label,
        caption,
        anchor_id,
        role,
    }
}

/// Mount an adapter for the lifetime of the calling component.
fn use_player(
    source_uri: &str,
    options: &PlayerOptions,
) -> (Rc<PlayerAdapter<PlatformEngine>>, Signal<PlayerState>) {
    let registry = use_playback_registry();
    let adapter = use_hook(|| {
        Rc::new(
            PlayerBuilder::new(&registry, source_uri)
                .options(options.clone())
                .resolver(page_resolver())
                .mount(PlatformEngine::new),
        )
    });
    let state = use_signal(|| adapter.state());

    use_hook({
        let adapter = adapter.clone();
        move || {
            let runtime = Runtime::current();
            adapter.on_state_change(move |next: &PlayerState| {
                let _guard = RuntimeGuard::new(runtime.clone());
                let mut state = state;
                state.set(next.clone());
            });
        }
    });

    use_drop({
        let adapter = adapter.clone();
        move || adapter.release()
    });

    (adapter, state)
}

/// Full player: play/pause, skip buttons, seekable progress bar.
///
/// Changing `source_uri` remounts the player with a fresh engine.
#[component]
pub fn AudioPlayer(
    source_uri: String,
    id: Option<String>,
    label: Option<String>,
    caption: Option<String>,
    anchor_id: Option<String>,
    #[props(default)] header: bool,
    #[props(default)] non_claiming: bool,
) -> Element {
    let options = player_options(id, label, caption, anchor_id, header, non_claiming);
    rsx! {
        PlayerBody {
            key: "{source_uri}",
            source_uri: source_uri.clone(),
            options,
            compact: false,
        }
    }
}

/// Compact player for table rows: play/pause and elapsed time only.
#[component]
pub fn AudioPlayerSmall(
    source_uri: String,
    id: Option<String>,
    label: Option<String>,
    caption: Option<String>,
    anchor_id: Option<String>,
    #[props(default)] header: bool,
    #[props(default)] non_claiming: bool,
) -> Element {
    let options = player_options(id, label, caption, anchor_id, header, non_claiming);
    rsx! {
        PlayerBody {
            key: "{source_uri}",
            source_uri: source_uri.clone(),
            options,
            compact: true,
        }
    }
}

#[component]
fn PlayerBody(source_uri: String, options: PlayerOptions, compact: bool) -> Element {
    let (adapter, state) = use_player(&source_uri, &options);
    let snapshot = use_playback_snapshot();

    let player = state();
    let enabled = player.controls_enabled();
    let is_current = snapshot.is_current(
        adapter.key(),
        adapter.source_uri(),
        options.role.claims_current(),
    );
    let title = options.label.clone().unwrap_or_else(|| "Recording".to_string());
    let elapsed = format_clock(player.position);
    let total = format_clock(player.duration);
    let slider_value = (player.progress() * SEEK_STEPS).round();

    let on_toggle = {
        let adapter = adapter.clone();
        move |_| adapter.toggle()
    };
    let on_rewind = {
        let adapter = adapter.clone();
        move |_| adapter.skip(-SKIP_SECONDS)
    };
    let on_forward = {
        let adapter = adapter.clone();
        move |_| adapter.skip(SKIP_SECONDS)
    };
    let on_seek = {
        let adapter = adapter.clone();
        move |e: Event<FormData>| {
            if let Ok(step) = e.value().parse::<f64>() {
                adapter.seek_fraction(step / SEEK_STEPS);
            }
        }
    };

    let container_class = match (compact, is_current) {
        (true, true) => "audio-player audio-player-small flex items-center gap-2 text-amber-300",
        (true, false) => "audio-player audio-player-small flex items-center gap-2 text-zinc-300",
        (false, true) => "audio-player flex flex-col gap-2 p-3 rounded-xl bg-zinc-900/80 ring-1 ring-amber-400/60",
        (false, false) => "audio-player flex flex-col gap-2 p-3 rounded-xl bg-zinc-900/60",
    };
    let toggle_icon = if player.is_loading {
        "loader"
    } else if player.is_playing {
        "pause"
    } else {
        "play"
    };
    let toggle_label = if player.is_playing { "Pause" } else { "Play" };

    if compact {
        return rsx! {
            div { class: "{container_class}",
                button {
                    class: "p-1.5 rounded-full hover:bg-zinc-800 disabled:opacity-40",
                    aria_label: toggle_label,
                    disabled: !enabled,
                    onclick: on_toggle,
                    Icon { name: toggle_icon.to_string(), class: "w-4 h-4".to_string() }
                }
                if let Some(error) = player.error.clone() {
                    span { class: "text-xs text-red-400", title: "{error}", "Unavailable" }
                } else {
                    span { class: "text-xs tabular-nums", "{elapsed}" }
                }
            }
        };
    }

    rsx! {
        div { class: "{container_class}",
            div { class: "flex items-baseline justify-between gap-3",
                span { class: "text-sm font-medium truncate", "{title}" }
                if let Some(caption) = options.caption.clone() {
                    span { class: "text-xs text-zinc-400 truncate", "{caption}" }
                }
            }
            div { class: "flex items-center gap-2",
                button {
                    class: "p-1.5 rounded-lg hover:bg-zinc-800 disabled:opacity-40",
                    aria_label: "Back {SKIP_SECONDS} seconds",
                    disabled: !enabled,
                    onclick: on_rewind,
                    Icon { name: "rewind".to_string(), class: "w-5 h-5".to_string() }
                }
                button {
                    class: "p-2 rounded-full bg-amber-500 text-zinc-950 hover:bg-amber-400 disabled:opacity-40",
                    aria_label: toggle_label,
                    disabled: !enabled,
                    onclick: on_toggle,
                    Icon { name: toggle_icon.to_string(), class: "w-5 h-5".to_string() }
                }
                button {
                    class: "p-1.5 rounded-lg hover:bg-zinc-800 disabled:opacity-40",
                    aria_label: "Forward {SKIP_SECONDS} seconds",
                    disabled: !enabled,
                    onclick: on_forward,
                    Icon { name: "forward".to_string(), class: "w-5 h-5".to_string() }
                }
                input {
                    r#type: "range",
                    class: "flex-1 accent-amber-500",
                    min: "0",
                    max: "{SEEK_STEPS}",
                    step: "1",
                    value: "{slider_value}",
                    disabled: !enabled,
                    oninput: on_seek,
                }
                span { class: "text-xs tabular-nums text-zinc-400", "{elapsed} / {total}" }
            }
            if let Some(error) = player.error.clone() {
                div { class: "flex items-center gap-2 text-xs text-red-400",
                    Icon { name: "alert".to_string(), class: "w-4 h-4".to_string() }
                    span { "{error}" }
                }
            }
        }
    }
}
