//! Browser side of the interaction gate.
//!
//! Any click, key press or touch on the page counts as an interaction. The
//! clock is shared between the document listener and the engine's gate.

use crate::store::{SpeechUiState, SpeechUiStateStoreExt};
use crate::wasm_utils::{now_ms, EventListener};
use dioxus::prelude::*;
use parley_common::{InteractionClock, InteractionGate};
use std::cell::RefCell;
use std::rc::Rc;

const INTERACTION_EVENTS: [&str; 3] = ["click", "keydown", "touchstart"];

pub type SharedClock = Rc<RefCell<InteractionClock>>;

pub struct BrowserGate {
    clock: SharedClock,
    store: Store<SpeechUiState>,
}

impl BrowserGate {
    pub fn new(clock: SharedClock, store: Store<SpeechUiState>) -> Self {
        Self { clock, store }
    }
}

impl InteractionGate for BrowserGate {
    fn permission_likely_expired(&self) -> bool {
        self.clock.borrow().is_expired(now_ms())
    }

    fn record_interaction(&mut self) {
        self.clock.borrow_mut().record(now_ms());
    }

    fn show_prompt(&mut self) {
        self.store.prompt_visible().set(true);
    }

    fn hide_prompt(&mut self) {
        self.store.prompt_visible().set(false);
    }
}

/// Record every user gesture on the document into `clock`. The listeners are
/// removed when the returned guards drop.
pub fn listen_for_interactions(clock: &SharedClock) -> Vec<EventListener> {
    let Some(document) = web_sys_x::window().and_then(|w| w.document()) else {
        return Vec::new();
    };

    INTERACTION_EVENTS
        .into_iter()
        .map(|name| {
            let clock = clock.clone();
            EventListener::new(document.as_ref(), name, move |_| {
                clock.borrow_mut().record(now_ms());
            })
        })
        .collect()
}
