//! `<audio>` element playback surface.
//!
//! Every fragment gets its own element and blob URL. Outcomes come back as
//! [`SpeechCommand::Player`] messages on the speech channel, never as direct
//! calls into the engine.

use crate::speech::SpeechCommand;
use crate::wasm_utils::{now_ms, sleep_ms, EventListener};
use futures::channel::mpsc::UnboundedSender;
use parley_common::{
    FaultKind, Fragment, PlaybackSurface, PlayerEvent, Scheduler, SessionTicket, SurfaceError,
};
use std::cell::Cell;
use std::time::Duration;
use tracing::{debug, warn};
use wasm_bindgen_x::prelude::*;
use wasm_bindgen_x::JsCast;

/// Id of the element sessions attach their `<audio>` to. Falls back to `<body>`.
pub const SURFACE_CONTAINER_ID: &str = "speech-surface";

fn create_blob_url(data: &[u8], mime_type: &str) -> Result<String, String> {
    let uint8_array = js_sys_x::Uint8Array::from(data);
    let array = js_sys_x::Array::new();
    array.push(&uint8_array);

    let opts = web_sys_x::BlobPropertyBag::new();
    opts.set_type(mime_type);
    let blob = web_sys_x::Blob::new_with_u8_array_sequence_and_options(&array, &opts)
        .map_err(|e| format!("Failed to create blob: {e:?}"))?;

    web_sys_x::Url::create_object_url_with_blob(&blob)
        .map_err(|e| format!("Failed to create blob URL: {e:?}"))
}

fn revoke_blob_url(url: &str) {
    let _ = web_sys_x::Url::revoke_object_url(url);
}

/// Kind of a `play()` rejection, from the DOMException name when there is one.
fn classify_rejection(err: &JsValue) -> FaultKind {
    err.dyn_ref::<web_sys_x::DomException>()
        .map(|e| FaultKind::from_exception_name(&e.name()))
        .unwrap_or(FaultKind::Unknown)
}

fn create_audio(document: &web_sys_x::Document) -> Result<web_sys_x::HtmlAudioElement, String> {
    document
        .create_element("audio")
        .map_err(|e| format!("{e:?}"))?
        .dyn_into::<web_sys_x::HtmlAudioElement>()
        .map_err(|_| "created element is not an <audio>".to_string())
}

/// A 16-bit mono PCM WAV of `samples` zero samples.
pub fn silent_wav(sample_rate: u32, samples: u32) -> Vec<u8> {
    let data_len = samples * 2;
    let mut wav = Vec::with_capacity(44 + data_len as usize);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&1u16.to_le_bytes()); // mono
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    wav.extend_from_slice(&2u16.to_le_bytes());
    wav.extend_from_slice(&16u16.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.resize(44 + data_len as usize, 0);
    wav
}

thread_local! {
    static LAST_WARM_UP: Cell<Option<f64>> = const { Cell::new(None) };
}

const WARM_UP_REUSE_MS: f64 = 1_000.0;

fn warmed_recently(last: Option<f64>, now: f64) -> bool {
    last.is_some_and(|t| now - t <= WARM_UP_REUSE_MS)
}

/// Play a short silent clip so the browser unlocks audio playback.
///
/// Must run inside the user's gesture handler: some browsers only honour
/// `play()` calls made synchronously from the click itself.
pub fn warm_up_audio() {
    let Some(document) = web_sys_x::window().and_then(|w| w.document()) else {
        return;
    };
    let audio = match create_audio(&document) {
        Ok(audio) => audio,
        Err(e) => {
            warn!("Audio warm-up skipped: {}", e);
            return;
        }
    };
    let url = match create_blob_url(&silent_wav(8000, 800), "audio/wav") {
        Ok(url) => url,
        Err(e) => {
            warn!("Audio warm-up skipped: {}", e);
            return;
        }
    };
    audio.set_src(&url);
    LAST_WARM_UP.with(|last| last.set(Some(now_ms())));

    match audio.play() {
        Ok(promise) => wasm_bindgen_futures_x::spawn_local(async move {
            if let Err(e) = wasm_bindgen_futures_x::JsFuture::from(promise).await {
                debug!("Audio warm-up refused: {}", classify_rejection(&e));
            }
            let _ = audio.pause();
            revoke_blob_url(&url);
        }),
        Err(e) => {
            debug!("Audio warm-up refused: {}", classify_rejection(&e));
            revoke_blob_url(&url);
        }
    }
}

/// One fragment's `<audio>` element, blob URL and listeners.
pub struct AudioSession {
    ticket: SessionTicket,
    audio: web_sys_x::HtmlAudioElement,
    url: String,
    listeners: Vec<EventListener>,
}

impl Drop for AudioSession {
    fn drop(&mut self) {
        // Listeners go first so pausing can't report a late event.
        self.listeners.clear();
        let _ = self.audio.pause();
        let _ = self.audio.remove_attribute("src");
        self.audio.load();
        self.audio.remove();
        revoke_blob_url(&self.url);
        debug!("Released audio session {}", self.ticket);
    }
}

pub struct AudioElementSurface {
    mime_type: String,
    events: UnboundedSender<SpeechCommand>,
}

impl AudioElementSurface {
    pub fn new(mime_type: impl Into<String>, events: UnboundedSender<SpeechCommand>) -> Self {
        Self {
            mime_type: mime_type.into(),
            events,
        }
    }

    fn send(events: &UnboundedSender<SpeechCommand>, event: PlayerEvent) {
        let _ = events.unbounded_send(SpeechCommand::Player(event));
    }
}

impl PlaybackSurface for AudioElementSurface {
    type Session = AudioSession;

    fn open(
        &mut self,
        ticket: SessionTicket,
        fragment: &Fragment,
    ) -> Result<AudioSession, SurfaceError> {
        let document = web_sys_x::window()
            .and_then(|w| w.document())
            .ok_or_else(|| SurfaceError::unavailable("no document"))?;

        let audio = create_audio(&document).map_err(SurfaceError::element)?;
        let container: web_sys_x::Element = document
            .get_element_by_id(SURFACE_CONTAINER_ID)
            .or_else(|| document.body().map(Into::into))
            .ok_or_else(|| SurfaceError::element("no container for <audio>"))?;

        let url = create_blob_url(fragment.bytes(), &self.mime_type).map_err(SurfaceError::source)?;
        audio.set_src(&url);

        let target: &web_sys_x::EventTarget = audio.as_ref();
        let ended = {
            let events = self.events.clone();
            EventListener::new(target, "ended", move |_| {
                Self::send(&events, PlayerEvent::Ended(ticket));
            })
        };
        let errored = {
            let events = self.events.clone();
            let element = audio.clone();
            EventListener::new(target, "error", move |_| {
                let kind = element
                    .error()
                    .map(|e| FaultKind::from_media_error_code(e.code()))
                    .unwrap_or(FaultKind::Unknown);
                Self::send(&events, PlayerEvent::Faulted { ticket, kind });
            })
        };

        let session = AudioSession {
            ticket,
            audio,
            url,
            listeners: vec![ended, errored],
        };

        // Dropping the session on failure revokes the URL.
        container
            .append_child(&session.audio)
            .map_err(|e| SurfaceError::element(format!("{e:?}")))?;

        Ok(session)
    }

    fn start(&mut self, session: &mut AudioSession) -> Result<(), FaultKind> {
        let promise = session.audio.play().map_err(|e| classify_rejection(&e))?;

        let events = self.events.clone();
        let ticket = session.ticket;
        wasm_bindgen_futures_x::spawn_local(async move {
            if let Err(e) = wasm_bindgen_futures_x::JsFuture::from(promise).await {
                let kind = classify_rejection(&e);
                debug!("play() for session {} rejected: {}", ticket, kind);
                Self::send(&events, PlayerEvent::Faulted { ticket, kind });
            }
        });
        Ok(())
    }

    fn warm_up(&mut self) {
        // The "Enable audio" click handler normally warmed up already, inside
        // the gesture. Only play again if that did not happen.
        if warmed_recently(LAST_WARM_UP.with(Cell::get), now_ms()) {
            return;
        }
        warm_up_audio();
    }
}

/// Timers for retry cooldowns and watchdogs, delivered on the speech channel.
pub struct TimerScheduler {
    events: UnboundedSender<SpeechCommand>,
}

impl TimerScheduler {
    pub fn new(events: UnboundedSender<SpeechCommand>) -> Self {
        Self { events }
    }
}

impl Scheduler for TimerScheduler {
    fn schedule(&mut self, delay: Duration, event: PlayerEvent) {
        let events = self.events.clone();
        let ms = delay.as_millis() as u64;
        wasm_bindgen_futures_x::spawn_local(async move {
            sleep_ms(ms).await;
            let _ = events.unbounded_send(SpeechCommand::Player(event));
        });
    }
}
