//! Speech stream adapter.
//!
//! Subscribes to the backend's server-sent speech events and hands every
//! audio payload to the speech task, in receipt order.

use crate::speech::SpeechHandle;
use crate::store::{SpeechUiState, SpeechUiStateStoreExt};
use crate::wasm_utils::EventListener;
use dioxus::prelude::*;
use parley_common::StreamMessage;
use tracing::{debug, info, warn};
use wasm_bindgen_x::prelude::*;
use wasm_bindgen_x::JsCast;

const STREAM_EVENTS: [&str; 5] = ["connected", "audio", "ping", "error", "close"];

/// An open `EventSource`. Closed when dropped.
pub struct SpeechStream {
    source: web_sys_x::EventSource,
    listeners: Vec<EventListener>,
}

impl SpeechStream {
    pub fn connect(
        url: &str,
        speech: SpeechHandle,
        store: Store<SpeechUiState>,
    ) -> Result<Self, String> {
        let source = web_sys_x::EventSource::new(url)
            .map_err(|e| format!("Failed to open speech stream: {e:?}"))?;
        info!("Connecting to speech stream at {}", url);

        let listeners = STREAM_EVENTS
            .into_iter()
            .map(|name| {
                let speech = speech.clone();
                let source_ref = source.clone();
                EventListener::new(source.as_ref(), name, move |event: JsValue| {
                    match event.dyn_ref::<web_sys_x::MessageEvent>() {
                        Some(message) => {
                            let data = message.data().as_string().unwrap_or_default();
                            on_event(name, &data, &speech, store, &source_ref);
                        }
                        // A plain `error` Event is the transport failing, not the server.
                        None => on_transport_error(store),
                    }
                })
            })
            .collect();

        Ok(Self { source, listeners })
    }
}

impl Drop for SpeechStream {
    fn drop(&mut self) {
        self.listeners.clear();
        self.source.close();
    }
}

fn on_event(
    name: &str,
    data: &str,
    speech: &SpeechHandle,
    store: Store<SpeechUiState>,
    source: &web_sys_x::EventSource,
) {
    let message = match StreamMessage::parse(name, data) {
        Ok(Some(message)) => message,
        Ok(None) => return,
        Err(e) => {
            warn!("Malformed '{}' speech event: {}", name, e);
            return;
        }
    };

    match message {
        StreamMessage::Connected => {
            info!("Speech stream connected");
            store.stream_connected().set(true);
            store.stream_error().set(None);
        }
        StreamMessage::Audio(payload) => speech.deliver_fragment(Some(payload)),
        StreamMessage::Ping => debug!("Speech stream keep-alive"),
        StreamMessage::Error(e) => {
            warn!("Speech stream reported an error: {}", e);
            store.stream_error().set(Some(e));
        }
        StreamMessage::Closed => {
            info!("Speech stream closed by server");
            store.stream_connected().set(false);
            source.close();
        }
    }
}

fn on_transport_error(store: Store<SpeechUiState>) {
    // EventSource reconnects by itself; `connected` clears this again.
    warn!("Speech stream connection lost");
    store.stream_connected().set(false);
    store
        .stream_error()
        .set(Some("connection lost, reconnecting".to_string()));
}
