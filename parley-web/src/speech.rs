//! Speech playback service for the browser.
//!
//! The engine lives inside one spawned task and is only ever touched from
//! there. Stream messages, `<audio>` callbacks, timers and button clicks all
//! reach it as [`SpeechCommand`]s on a single unbounded channel, so no DOM
//! callback re-enters the engine.

use crate::gate::{listen_for_interactions, BrowserGate};
use crate::playback::{AudioElementSurface, TimerScheduler};
use crate::store::{apply_snapshot, SpeechUiState};
use dioxus::prelude::*;
use futures::channel::mpsc::{self, UnboundedSender};
use futures::StreamExt;
use parley_common::{InteractionClock, PlayerConfig, PlayerEvent, StreamPlayer};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info};

pub type WebPlayer = StreamPlayer<AudioElementSurface, BrowserGate, TimerScheduler>;

#[derive(Debug)]
pub enum SpeechCommand {
    /// Base64 payload from the speech stream
    Fragment(Option<String>),
    Player(PlayerEvent),
    EnableAudio,
    Clear,
}

/// Cheap handle for sending commands to the speech task
#[derive(Clone)]
pub struct SpeechHandle {
    command_tx: UnboundedSender<SpeechCommand>,
}

impl SpeechHandle {
    pub fn deliver_fragment(&self, payload: Option<String>) {
        let _ = self.command_tx.unbounded_send(SpeechCommand::Fragment(payload));
    }

    pub fn enable_audio(&self) {
        let _ = self.command_tx.unbounded_send(SpeechCommand::EnableAudio);
    }

    pub fn clear(&self) {
        let _ = self.command_tx.unbounded_send(SpeechCommand::Clear);
    }
}

/// Build the engine and spawn its command loop in the current scope.
///
/// The task, and with it any live `<audio>` session, is dropped when the
/// scope unmounts.
pub fn start_speech(config: PlayerConfig, store: Store<SpeechUiState>) -> SpeechHandle {
    let (command_tx, mut command_rx) = mpsc::unbounded();

    let clock = Rc::new(RefCell::new(InteractionClock::new(
        config.interaction_timeout_ms,
    )));
    let surface = AudioElementSurface::new(config.mime_type.clone(), command_tx.clone());
    let gate = BrowserGate::new(clock.clone(), store);
    let scheduler = TimerScheduler::new(command_tx.clone());
    let mut player: WebPlayer = StreamPlayer::new(config, surface, gate, scheduler);

    spawn(async move {
        let _interactions = listen_for_interactions(&clock);
        info!("Speech playback ready");

        while let Some(command) = command_rx.next().await {
            debug!("Speech command: {:?}", command);
            run_command(&mut player, command);
            apply_snapshot(store, player.snapshot());
        }
    });

    SpeechHandle { command_tx }
}

fn run_command(player: &mut WebPlayer, command: SpeechCommand) {
    match command {
        SpeechCommand::Fragment(payload) => player.deliver_fragment(payload.as_deref()),
        SpeechCommand::Player(event) => player.handle(event),
        SpeechCommand::EnableAudio => player.activate_gate(),
        SpeechCommand::Clear => player.clear(),
    }
}
