//! Call desk dashboard: single-active-media playback for call and complaint
//! recordings, plus the same-origin audio proxy the players load through.

pub mod components;
pub mod navigation;
pub mod playback;
#[cfg(not(target_arch = "wasm32"))]
pub mod proxy;
