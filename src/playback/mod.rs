//! Single-active-media playback coordination.
//!
//! [`PlaybackRegistry`] tracks the one media item that may be audible,
//! [`PlayerAdapter`] binds each rendered player's engine to it, and
//! [`ScrollAnchor`] lets the UI jump back to whatever is playing.

mod adapter;
mod engine;
mod media;
mod registry;
mod resolver;
mod scroll_anchor;
#[cfg(target_arch = "wasm32")]
mod web_engine;

pub use adapter::{
    PlayerAdapter, PlayerBuilder, PlayerOptions, PlayerRole, PlayerState, SKIP_SECONDS,
};
pub use engine::{
    EngineError, EngineEvent, EngineListener, EngineResult, EventSink, TransportEngine,
    UnsupportedEngine,
};
pub use media::CurrentMedia;
pub use registry::{PlaybackHandle, PlaybackRegistry, PlaybackSnapshot, PlayerKey, Subscription};
pub use resolver::{resolve_media_url, MediaResolver, AUDIO_PROXY_ENDPOINT};
pub use scroll_anchor::{AnchorScroller, ScrollAnchor, PULSE_CLASS, PULSE_DURATION};
#[cfg(target_arch = "wasm32")]
pub use scroll_anchor::DomScroller;
#[cfg(target_arch = "wasm32")]
pub use web_engine::HtmlAudioEngine;

/// Engine the UI components mount on this target.
#[cfg(target_arch = "wasm32")]
pub type PlatformEngine = HtmlAudioEngine;

/// Engine the UI components mount on this target.
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformEngine = UnsupportedEngine;
