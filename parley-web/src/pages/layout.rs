use crate::config::ClientConfig;
use crate::speech::{start_speech, SpeechHandle};
use crate::store::{SpeechUiState, SpeechUiStateStoreExt};
use crate::stream::SpeechStream;
use crate::Route;
use dioxus::prelude::*;
use std::rc::Rc;
use tracing::error;

/// Owns the speech service and stream for every page below it.
#[component]
pub fn AppLayout() -> Element {
    let config = use_hook(ClientConfig::load);
    let speech_state = use_store(SpeechUiState::default);

    let speech: SpeechHandle = use_hook(|| start_speech(config.player.clone(), speech_state));
    let _stream = use_hook(|| {
        match SpeechStream::connect(&config.stream_url(), speech.clone(), speech_state) {
            Ok(stream) => Some(Rc::new(stream)),
            Err(e) => {
                error!("{}", e);
                speech_state.stream_error().set(Some(e));
                None
            }
        }
    });

    use_context_provider(|| config.clone());
    use_context_provider(|| speech.clone());
    use_context_provider(|| speech_state);

    rsx! {
        div { class: "app",
            header { class: "app-header",
                h1 { "Parley" }
                span { class: "app-subtitle", "Practice speaking with your tutor" }
            }
            main { class: "app-main", Outlet::<Route> {} }
            // Speech sessions attach their <audio> elements here.
            div { id: "speech-surface", hidden: true }
        }
    }
}
