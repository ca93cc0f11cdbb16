pub mod api;
pub mod config;
pub mod gate;
pub mod pages;
pub mod playback;
pub mod speech;
pub mod store;
pub mod stream;
pub mod wasm_utils;

use dioxus::prelude::*;
use pages::{AppLayout, Chat};

pub const MAIN_CSS: Asset = asset!("/assets/main.css");

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(AppLayout)]
    #[route("/")]
    Chat {},
}

#[component]
pub fn App() -> Element {
    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }
        div { class: "min-h-screen", Router::<Route> {} }
    }
}
