//! Browser transport engine backed by a detached `<audio>` element.

use std::cell::{Cell, RefCell};

use tracing::{trace, warn};
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::HtmlAudioElement;

use super::engine::{EngineError, EngineEvent, EngineResult, EventSink, TransportEngine};

type Listener = (&'static str, Closure<dyn FnMut()>);

pub struct HtmlAudioEngine {
    audio: Option<HtmlAudioElement>,
    url: String,
    events: EventSink,
    listeners: RefCell<Vec<Listener>>,
    destroyed: Cell<bool>,
}

impl HtmlAudioEngine {
    pub fn new(url: &str, events: EventSink) -> Self {
        let audio = match HtmlAudioElement::new() {
            Ok(audio) => {
                audio.set_preload("metadata");
                Some(audio)
            }
            Err(err) => {
                warn!(?err, "html audio engine: could not create audio element");
                None
            }
        };

        let engine = Self {
            audio,
            url: url.to_string(),
            events,
            listeners: RefCell::new(Vec::new()),
            destroyed: Cell::new(false),
        };
        engine.attach_listeners();
        engine
    }

    fn attach_listeners(&self) {
        let Some(audio) = self.audio.as_ref() else {
            return;
        };

        let bindings: [(&'static str, fn(&HtmlAudioElement) -> EngineEvent); 7] = [
            ("loadedmetadata", |audio| EngineEvent::Ready {
                duration: finite_or_zero(audio.duration()),
            }),
            ("error", |audio| EngineEvent::Error(playback_error_message(audio))),
            ("play", |_| EngineEvent::Play),
            ("pause", |_| EngineEvent::Pause),
            ("ended", |_| EngineEvent::Finish),
            ("timeupdate", |audio| {
                EngineEvent::TimeUpdate(finite_or_zero(audio.current_time()))
            }),
            ("seeked", |audio| {
                EngineEvent::TimeUpdate(finite_or_zero(audio.current_time()))
            }),
        ];

        let mut listeners = self.listeners.borrow_mut();
        for (name, to_event) in bindings {
            let element = audio.clone();
            let events = self.events.clone();
            let closure = Closure::wrap(
                Box::new(move || events.emit(to_event(&element))) as Box<dyn FnMut()>
            );
            if let Err(err) =
                audio.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
            {
                warn!(event = name, ?err, "html audio engine: failed to attach listener");
                continue;
            }
            listeners.push((name, closure));
        }
    }

    fn element(&self) -> EngineResult<&HtmlAudioElement> {
        if self.destroyed.get() {
            return Err(EngineError::Destroyed);
        }
        self.audio.as_ref().ok_or(EngineError::Unsupported)
    }
}

impl TransportEngine for HtmlAudioEngine {
    fn load(&self) {
        match self.element() {
            Ok(audio) => {
                trace!(url = %self.url, "html audio engine: loading");
                audio.set_src(&self.url);
                audio.load();
            }
            Err(err) => self.events.emit(EngineEvent::Error(err.to_string())),
        }
    }

    fn play(&self) -> EngineResult<()> {
        let audio = self.element()?;
        let promise = audio
            .play()
            .map_err(|err| EngineError::command("play", format!("{err:?}")))?;
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = wasm_bindgen_futures::JsFuture::from(promise).await {
                warn!(?err, "html audio engine: play was rejected");
            }
        });
        Ok(())
    }

    fn pause(&self) -> EngineResult<()> {
        self.element()?
            .pause()
            .map_err(|err| EngineError::command("pause", format!("{err:?}")))
    }

    fn is_playing(&self) -> bool {
        self.element()
            .map(|audio| !audio.paused() && !audio.ended())
            .unwrap_or(false)
    }

    fn seek_to(&self, seconds: f64) -> EngineResult<()> {
        self.element()?.set_current_time(seconds.max(0.0));
        Ok(())
    }

    fn duration(&self) -> f64 {
        self.element()
            .map(|audio| finite_or_zero(audio.duration()))
            .unwrap_or(0.0)
    }

    fn current_time(&self) -> f64 {
        self.element()
            .map(|audio| finite_or_zero(audio.current_time()))
            .unwrap_or(0.0)
    }

    fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }
        let Some(audio) = self.audio.as_ref() else {
            return;
        };
        let _ = audio.pause();
        for (name, closure) in self.listeners.borrow_mut().drain(..) {
            let _ = audio
                .remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
        }
        // Dropping the source and reloading frees the decoder and network stream.
        let _ = audio.remove_attribute("src");
        audio.load();
        trace!(url = %self.url, "html audio engine: destroyed");
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

fn playback_error_message(audio: &HtmlAudioElement) -> String {
    let code = audio.error().map(|error| error.code()).unwrap_or(0);
    match code {
        1 => "Playback was aborted before the recording loaded.",
        2 => "Network error while loading this recording.",
        3 => "The recording could not be decoded.",
        4 => "This recording format is not supported.",
        _ => "Unable to load this recording.",
    }
    .to_string()
}
