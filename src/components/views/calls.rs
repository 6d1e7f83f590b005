use dioxus::prelude::*;

use super::records::{find_call, CALLS};
use crate::components::{use_stop_all_audio, AppView, AudioPlayer, AudioPlayerSmall, Icon};

#[component]
pub fn CallsView() -> Element {
    rsx! {
        section { class: "max-w-4xl mx-auto space-y-4",
            h1 { class: "text-xl font-semibold", "Today's calls" }
            table { class: "w-full text-sm",
                thead {
                    tr { class: "text-left text-zinc-500",
                        th { class: "py-2", "Call" }
                        th { "Caller" }
                        th { "Agent" }
                        th { "Recording" }
                    }
                }
                tbody {
                    for call in CALLS.iter() {
                        tr {
                            key: "{call.id}",
                            id: call.anchor_id(),
                            class: "border-t border-zinc-800/60 rounded-lg",
                            td { class: "py-2",
                                Link {
                                    class: "text-amber-400 hover:underline",
                                    to: AppView::CallDetailView {
                                        id: call.id.to_string(),
                                    },
                                    "#{call.id}"
                                }
                                span { class: "ml-2 text-zinc-500", "{call.started_at}" }
                            }
                            td { "{call.caller}" }
                            td { "{call.agent}" }
                            td {
                                AudioPlayerSmall {
                                    source_uri: call.recording.to_string(),
                                    id: call.id.to_string(),
                                    label: format!("Call #{}", call.id),
                                    caption: call.caller.to_string(),
                                    anchor_id: call.anchor_id(),
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
pub fn CallDetailView(id: String) -> Element {
    let stop_all = use_stop_all_audio();
    let mut notes_open = use_signal(|| false);

    let Some(call) = find_call(&id) else {
        return rsx! {
            p { class: "text-zinc-400", "No call with id {id}." }
        };
    };
    let anchor = format!("call-detail-{}", call.id);

    rsx! {
        section { class: "max-w-3xl mx-auto space-y-6",
            div { class: "flex items-center justify-between gap-4",
                div {
                    h1 { class: "text-xl font-semibold", "Call #{call.id}" }
                    p { class: "text-sm text-zinc-400", "{call.caller} · {call.agent} · {call.started_at}" }
                }
                // Header preview shares the source with the main player below.
                AudioPlayerSmall {
                    source_uri: call.recording.to_string(),
                    id: call.id.to_string(),
                    label: format!("Call #{}", call.id),
                    header: true,
                }
            }
            div { id: "{anchor}",
                AudioPlayer {
                    source_uri: call.recording.to_string(),
                    id: call.id.to_string(),
                    label: format!("Call #{}", call.id),
                    caption: call.caller.to_string(),
                    anchor_id: anchor.clone(),
                }
            }
            button {
                class: "flex items-center gap-2 px-3 py-1.5 rounded-lg text-sm bg-zinc-800 hover:bg-zinc-700",
                onclick: move |_| {
                    stop_all();
                    notes_open.set(true);
                },
                Icon { name: "alert".to_string(), class: "w-4 h-4".to_string() }
                "Write call notes"
            }
            if notes_open() {
                div { class: "fixed inset-0 z-50 flex items-center justify-center bg-black/60",
                    div { class: "w-full max-w-lg p-4 rounded-xl bg-zinc-900 space-y-3",
                        h2 { class: "font-semibold", "Notes for call #{call.id}" }
                        textarea { class: "w-full h-32 p-2 rounded-lg bg-zinc-950 text-sm" }
                        button {
                            class: "px-3 py-1.5 rounded-lg text-sm bg-amber-500 text-zinc-950",
                            onclick: move |_| notes_open.set(false),
                            "Close"
                        }
                    }
                }
            }
        }
    }
}
