//! Dioxus UI: playback context, players and the dashboard shell.

mod app;
mod app_view;
mod audio_player;
mod icons;
mod navigation_guard;
mod now_playing;
mod playback_context;
mod views;

pub use app::*;
pub use app_view::*;
pub use audio_player::*;
pub use icons::*;
pub use navigation_guard::*;
pub use now_playing::*;
pub use playback_context::*;
pub(crate) use playback_context::{page_origin, page_resolver};
