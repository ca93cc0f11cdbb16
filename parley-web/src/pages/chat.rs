use crate::api::{self, ChatRequest};
use crate::config::ClientConfig;
use crate::playback::warm_up_audio;
use crate::speech::SpeechHandle;
use crate::store::{
    ChatUiState, ChatUiStateStoreExt, PendingTurn, SpeechUiState, SpeechUiStateStoreExt,
};
use crate::wasm_utils::read_selected_file;
use dioxus::prelude::*;
use parley_common::{Role, Scenario};
use tracing::{debug, info, warn};

const RECORDING_INPUT_ID: &str = "recording-input";

fn new_conversation_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn message_class(role: Role) -> &'static str {
    match role {
        Role::User => "chat-message user",
        Role::Assistant => "chat-message assistant",
    }
}

/// Post a turn and apply the reply, unless the conversation was reset meanwhile.
fn send_turn(mut chat: Store<ChatUiState>, url: String, voice: String, turn: PendingTurn) {
    spawn(async move {
        let PendingTurn {
            message,
            conversation_id,
            context,
            scenario,
        } = turn;
        let request = ChatRequest {
            message: &message,
            conversation_id: &conversation_id,
            context,
            scenario,
            voice: &voice,
        };

        let reply = api::send_chat(&url, &request).await.map(|r| r.response);
        if let Err(e) = &reply {
            warn!("Chat request failed: {}", e);
        }
        if !chat.write().finish_turn(&conversation_id, reply) {
            debug!("Dropping reply for abandoned conversation {}", conversation_id);
        }
    });
}

#[component]
pub fn Chat() -> Element {
    let config: ClientConfig = use_context();
    let speech: SpeechHandle = use_context();
    let speech_state: Store<SpeechUiState> = use_context();

    let mut chat = use_store(|| ChatUiState {
        conversation_id: new_conversation_id(),
        scenario: config.scenario,
        ..Default::default()
    });
    let client = use_signal(|| config.clone());

    let mut send_message = move || {
        let draft = chat.draft().read().clone();
        let Some(turn) = chat.write().begin_turn(&draft) else {
            return;
        };
        chat.draft().set(String::new());

        let client = client.read();
        send_turn(chat, client.chat_url(), client.voice.clone(), turn);
    };

    let on_recording_picked = move |_| {
        let Some(conversation_id) = chat.write().begin_transcription() else {
            return;
        };
        let (stt_url, language, chat_url, voice) = {
            let client = client.read();
            (
                client.transcribe_url(),
                client.language.clone(),
                client.chat_url(),
                client.voice.clone(),
            )
        };

        spawn(async move {
            let result = match read_selected_file(RECORDING_INPUT_ID).await {
                Ok(Some(audio)) => api::transcribe(&stt_url, &audio, &language).await,
                Ok(None) => Err("No recording selected.".to_string()),
                Err(e) => Err(e),
            };
            if let Err(e) = &result {
                warn!("Transcription failed: {}", e);
            }

            let text = chat
                .write()
                .finish_transcription(&conversation_id, result);
            let Some(text) = text else {
                return;
            };
            info!("Transcribed recording ({} chars)", text.len());
            let turn = chat.write().begin_turn(&text);
            if let Some(turn) = turn {
                send_turn(chat, chat_url, voice, turn);
            }
        });
    };

    let on_reset = {
        let speech = speech.clone();
        move |_| {
            speech.clear();
            let id = new_conversation_id();
            info!("Starting new conversation {}", id);
            chat.write().reset(id);
        }
    };

    let on_enable_audio = move |_| {
        // play() has to happen inside the click for some browsers.
        warm_up_audio();
        speech.enable_audio();
    };

    let messages = chat.transcript().read().messages().to_vec();
    let draft = chat.draft().read().clone();
    let sending = *chat.sending().read();
    let transcribing = *chat.transcribing().read();
    let busy = sending || transcribing;
    let error = chat.error().read().clone();
    let scenario = *chat.scenario().read();
    let status = speech_state.read().status_text();
    let prompt_visible = *speech_state.prompt_visible().read();

    rsx! {
        div { class: "chat",
            div { class: "chat-toolbar",
                select {
                    value: "{scenario.as_str()}",
                    onchange: move |e| chat.scenario().set(Scenario::from_name(&e.value())),
                    for s in Scenario::ALL {
                        option { key: "{s.as_str()}", value: "{s.as_str()}", "{s}" }
                    }
                }
                button { class: "button-secondary", onclick: on_reset, "New conversation" }
            }

            div { class: "chat-status",
                span { "{status}" }
                if prompt_visible {
                    button { class: "button-primary", onclick: on_enable_audio, "Enable audio" }
                }
            }

            div { class: "chat-transcript",
                if messages.is_empty() {
                    p { class: "chat-empty", "Say hello to start the conversation." }
                }
                for (i, msg) in messages.iter().enumerate() {
                    div { key: "{i}", class: message_class(msg.role), "{msg.content}" }
                }
                if transcribing {
                    div { class: "chat-message user pending", "Transcribing..." }
                }
                if sending {
                    div { class: "chat-message assistant pending", "..." }
                }
            }

            if let Some(error) = error {
                div { class: "chat-error", "{error}" }
            }

            div { class: "chat-input",
                input {
                    value: "{draft}",
                    placeholder: "Type your message",
                    disabled: busy,
                    oninput: move |e| chat.draft().set(e.value()),
                    onkeydown: move |e: KeyboardEvent| {
                        if e.key() == Key::Enter {
                            send_message();
                        }
                    },
                }
                button {
                    class: "button-primary",
                    disabled: busy,
                    onclick: move |_| send_message(),
                    "Send"
                }
                label { class: "button-secondary",
                    "Send recording"
                    input {
                        id: RECORDING_INPUT_ID,
                        r#type: "file",
                        accept: "audio/*",
                        hidden: true,
                        disabled: busy,
                        onchange: on_recording_picked,
                    }
                }
            }
        }
    }
}
