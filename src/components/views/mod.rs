mod calls;
mod complaints;
mod records;

pub use calls::*;
pub use complaints::*;

use dioxus::prelude::*;

use crate::components::AppView;

#[component]
pub fn NotFound(segments: Vec<String>) -> Element {
    let path = segments.join("/");
    rsx! {
        section { class: "min-h-screen flex flex-col items-center justify-center gap-3 bg-zinc-950 text-white",
            p { class: "text-zinc-400", "Nothing at /{path}" }
            Link { class: "text-amber-400 hover:underline", to: AppView::CallsView {}, "Back to calls" }
        }
    }
}
