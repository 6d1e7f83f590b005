use crate::components::{
    section_of, view_label, AppView, Icon, NavigationGuard, NowPlayingBar, PlaybackProvider,
};
use dioxus::prelude::*;

#[component]
pub fn AppShell() -> Element {
    rsx! {
        PlaybackProvider {
            NavigationGuard {}
            ShellFrame {}
        }
    }
}

#[component]
fn ShellFrame() -> Element {
    let view = use_route::<AppView>();
    let title = view_label(&view);

    rsx! {
        div { class: "app-container flex flex-col min-h-screen bg-zinc-950 text-white",
            header { class: "border-b border-zinc-800/60 bg-zinc-950/80 backdrop-blur-xl",
                div { class: "flex items-center justify-between px-4 py-3",
                    div { class: "flex items-center gap-2",
                        Icon {
                            name: "phone".to_string(),
                            class: "w-5 h-5 text-amber-400".to_string(),
                        }
                        span { class: "font-semibold", "Call Desk" }
                        span { class: "text-zinc-500", "/ {title}" }
                    }
                    nav { class: "flex items-center gap-1",
                        NavTab { to: AppView::CallsView {}, label: "Calls" }
                        NavTab { to: AppView::ComplaintsView {}, label: "Complaints" }
                    }
                }
            }

            main { class: "flex-1 overflow-y-auto px-4 py-6 pb-24",
                Outlet::<AppView> {}
            }

            NowPlayingBar {}
        }
    }
}

#[component]
fn NavTab(to: AppView, label: &'static str) -> Element {
    let current = use_route::<AppView>();
    let active = section_of(&current) == section_of(&to);
    let class = if active {
        "px-3 py-1.5 rounded-lg text-sm bg-zinc-800 text-white"
    } else {
        "px-3 py-1.5 rounded-lg text-sm text-zinc-400 hover:text-white hover:bg-zinc-800/60"
    };

    rsx! {
        Link { class: "{class}", to: to.clone(), "{label}" }
    }
}
