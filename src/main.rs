use calldesk::components::AppView;
use dioxus::prelude::*;

const APP_CSS: Asset = asset!("/assets/styling/app.css");

fn main() {
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    rsx! {
        document::Title { "Call Desk" }
        document::Meta { name: "theme-color", content: "#09090b" }
        document::Stylesheet { href: APP_CSS }

        Router::<AppView> {}
    }
}
