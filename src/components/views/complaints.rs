use dioxus::prelude::*;

use super::records::{find_complaint, COMPLAINTS};
use crate::components::{AppView, AudioPlayer, AudioPlayerSmall};

#[component]
pub fn ComplaintsView() -> Element {
    rsx! {
        section { class: "max-w-4xl mx-auto space-y-3",
            h1 { class: "text-xl font-semibold", "Complaints" }
            for complaint in COMPLAINTS.iter() {
                div {
                    key: "{complaint.id}",
                    id: complaint.anchor_id(),
                    class: "flex items-center justify-between gap-4 p-3 rounded-xl bg-zinc-900/60",
                    div { class: "min-w-0",
                        Link {
                            class: "font-medium text-amber-400 hover:underline",
                            to: AppView::ComplaintDetailView {
                                id: complaint.id.to_string(),
                            },
                            "{complaint.id} · {complaint.subject}"
                        }
                        p { class: "text-xs text-zinc-400", "{complaint.customer} · {complaint.status}" }
                    }
                    div { class: "flex items-center gap-4",
                        if let Some(call) = complaint.call() {
                            AudioPlayerSmall {
                                source_uri: call.recording.to_string(),
                                id: call.id.to_string(),
                                label: format!("Call #{}", call.id),
                                caption: complaint.customer.to_string(),
                                anchor_id: complaint.anchor_id(),
                            }
                        }
                        if let Some(voicemail) = complaint.voicemail {
                            // Voicemail previews never take over the now-playing bar.
                            AudioPlayerSmall {
                                source_uri: voicemail.to_string(),
                                label: format!("Voicemail {}", complaint.id),
                                non_claiming: true,
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
pub fn ComplaintDetailView(id: String) -> Element {
    let Some(complaint) = find_complaint(&id) else {
        return rsx! {
            p { class: "text-zinc-400", "No complaint with id {id}." }
        };
    };
    let anchor = format!("complaint-detail-{}", complaint.id);

    rsx! {
        section { class: "max-w-3xl mx-auto space-y-4",
            h1 { class: "text-xl font-semibold", "{complaint.id} · {complaint.subject}" }
            p { class: "text-sm text-zinc-400", "{complaint.customer} · {complaint.status}" }
            if let Some(call) = complaint.call() {
                div { id: "{anchor}",
                    AudioPlayer {
                        source_uri: call.recording.to_string(),
                        id: call.id.to_string(),
                        label: format!("Call #{}", call.id),
                        caption: complaint.customer.to_string(),
                        anchor_id: anchor.clone(),
                    }
                }
            } else {
                p { class: "text-sm text-zinc-500", "No linked call recording." }
            }
            if let Some(voicemail) = complaint.voicemail {
                AudioPlayer {
                    source_uri: voicemail.to_string(),
                    label: "Voicemail".to_string(),
                    non_claiming: true,
                }
            }
        }
    }
}
