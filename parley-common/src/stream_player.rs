//! Streaming speech playback engine.
//!
//! Plays an open-ended sequence of fragments back to back in arrival order,
//! one at a time. The engine is a synchronous state machine: the host calls
//! [`StreamPlayer::enqueue`]/[`StreamPlayer::deliver_fragment`] as fragments
//! arrive, [`StreamPlayer::handle`] for every [`PlayerEvent`] its surface and
//! scheduler produce, and [`StreamPlayer::activate_gate`] when the user
//! clicks "enable audio". All of those must be called from a single consumer
//! so transitions stay serialized.

use tracing::{debug, error, info, warn};

use crate::ingest::decode_payload;
use crate::{
    FaultKind, Fragment, FragmentQueue, InteractionGate, PlaybackSurface, PlayerConfig,
    PlayerEvent, Scheduler, SessionTicket, SurfaceError,
};

/// The single "now playing" slot. A live session only exists inside
/// `Playing`, so there can never be two.
enum Slot<S> {
    Idle,
    Playing {
        ticket: SessionTicket,
        seq: u64,
        session: S,
    },
    /// A fragment just failed; waiting out the retry delay before the next one
    Cooldown(SessionTicket),
    /// Playback refused until the user activates the "enable audio" prompt
    Gated,
    /// No audio playback in this environment
    Disabled(String),
}

/// Coarse engine state for the UI
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlayerStatus {
    #[default]
    Idle,
    Playing,
    /// Skipping past a fragment that failed to play
    Recovering,
    WaitingForPermission,
    Unavailable(String),
}

/// Point-in-time view of the engine
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlayerSnapshot {
    pub status: PlayerStatus,
    /// Fragments waiting, including the one currently playing
    pub queued: usize,
    /// Sequence number of the fragment currently playing
    pub current_seq: Option<u64>,
}

pub struct StreamPlayer<P: PlaybackSurface, G: InteractionGate, T: Scheduler> {
    config: PlayerConfig,
    queue: FragmentQueue,
    slot: Slot<P::Session>,
    last_ticket: u64,
    surface: P,
    gate: G,
    scheduler: T,
}

impl<P: PlaybackSurface, G: InteractionGate, T: Scheduler> StreamPlayer<P, G, T> {
    pub fn new(config: PlayerConfig, surface: P, gate: G, scheduler: T) -> Self {
        Self {
            config,
            queue: FragmentQueue::new(),
            slot: Slot::Idle,
            last_ticket: 0,
            surface,
            gate,
            scheduler,
        }
    }

    /// Decode and enqueue one producer payload. Invalid payloads are logged
    /// and dropped without touching the queue.
    pub fn deliver_fragment(&mut self, payload: Option<&str>) {
        match decode_payload(payload) {
            Ok(fragment) => self.enqueue(fragment),
            Err(e) => warn!("Ignoring speech fragment: {}", e),
        }
    }

    /// Same as [`deliver_fragment`](Self::deliver_fragment) for producers
    /// that already hold raw bytes.
    pub fn deliver_bytes(&mut self, bytes: Vec<u8>) {
        self.enqueue(Fragment::new(bytes));
    }

    /// Append a fragment to the back of the queue and start playback if idle.
    pub fn enqueue(&mut self, fragment: Fragment) {
        if fragment.is_empty() {
            warn!("Ignoring empty speech fragment");
            return;
        }
        if let Slot::Disabled(reason) = &self.slot {
            debug!("Dropping fragment, audio unavailable: {}", reason);
            return;
        }

        let seq = self.queue.push(fragment);
        debug!("Queued fragment {} ({} pending)", seq, self.queue.len());

        if matches!(self.slot, Slot::Idle) {
            self.play_next();
        }
    }

    /// Start the fragment at the head of the queue, if the slot is free.
    ///
    /// The fragment stays at the head until its session terminates. Starting
    /// from idle consults the gate first when the last gesture looks stale.
    pub fn play_next(&mut self) {
        self.start_front(true);
    }

    /// Chain to the next fragment while a reply is already flowing. Audio
    /// just played, so the stale-gesture check does not apply.
    fn continue_playback(&mut self) {
        self.start_front(false);
    }

    fn start_front(&mut self, check_permission: bool) {
        if !matches!(self.slot, Slot::Idle) {
            return;
        }

        let Some(fragment) = self.queue.front() else {
            debug!("Speech queue drained");
            return;
        };

        if check_permission && self.config.preemptive_gate && self.gate.permission_likely_expired()
        {
            info!("No recent user gesture, asking before playing fragment {}", fragment.seq());
            self.enter_gate();
            return;
        }

        self.last_ticket += 1;
        let ticket = SessionTicket::new(self.last_ticket);
        let seq = fragment.seq();

        match self.surface.open(ticket, fragment) {
            Ok(session) => {
                self.slot = Slot::Playing {
                    ticket,
                    seq,
                    session,
                };
            }
            Err(e) if e.is_transient() => {
                warn!("Could not prepare fragment {}: {}", seq, e);
                self.queue.pop_front();
                self.enter_cooldown(ticket);
                return;
            }
            Err(e) => {
                self.disable(e);
                return;
            }
        }

        debug!("Playing fragment {} in session {}", seq, ticket);
        let started = match &mut self.slot {
            Slot::Playing { session, .. } => self.surface.start(session),
            _ => Ok(()),
        };
        if let Err(kind) = started {
            self.on_fault(ticket, kind);
            return;
        }

        if let Some(timeout) = self.config.session_timeout() {
            self.scheduler
                .schedule(timeout, PlayerEvent::WatchdogFired(ticket));
        }
    }

    /// Feed an asynchronous outcome back into the engine.
    pub fn handle(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::Ended(ticket) => {
                if self.current_ticket() != Some(ticket) {
                    debug!("Ignoring stale end of session {}", ticket);
                    return;
                }
                self.slot = Slot::Idle;
                if let Some(done) = self.queue.pop_front() {
                    debug!("Fragment {} finished", done.seq());
                }
                self.continue_playback();
            }
            PlayerEvent::Faulted { ticket, kind } => {
                if self.current_ticket() != Some(ticket) {
                    debug!("Ignoring stale fault of session {}: {}", ticket, kind);
                    return;
                }
                self.on_fault(ticket, kind);
            }
            PlayerEvent::WatchdogFired(ticket) => {
                if self.current_ticket() != Some(ticket) {
                    return;
                }
                self.on_fault(ticket, FaultKind::Stalled);
            }
            PlayerEvent::CooldownElapsed(ticket) => {
                if !matches!(self.slot, Slot::Cooldown(t) if t == ticket) {
                    debug!("Ignoring stale cooldown for session {}", ticket);
                    return;
                }
                self.slot = Slot::Idle;
                self.continue_playback();
            }
        }
    }

    /// The user activated the "enable audio" prompt (or otherwise made a
    /// gesture while the pipeline was frozen). Retries the blocked fragment.
    pub fn activate_gate(&mut self) {
        self.gate.record_interaction();
        if !matches!(self.slot, Slot::Gated) {
            return;
        }

        info!("Audio enabled by user, resuming speech playback");
        self.gate.hide_prompt();
        self.surface.warm_up();
        self.slot = Slot::Idle;
        self.continue_playback();
    }

    /// Drop every pending fragment and tear down the live session.
    ///
    /// Safe to call in any state, any number of times.
    pub fn clear(&mut self) {
        let dropped = self.queue.len();
        self.queue.clear();

        match std::mem::replace(&mut self.slot, Slot::Idle) {
            Slot::Playing { ticket, session, .. } => {
                debug!("Stopping session {}", ticket);
                drop(session);
            }
            Slot::Gated => self.gate.hide_prompt(),
            Slot::Disabled(reason) => self.slot = Slot::Disabled(reason),
            Slot::Idle | Slot::Cooldown(_) => {}
        }

        if dropped > 0 {
            info!("Cleared {} pending speech fragments", dropped);
        }
    }

    /// True iff a playback session is live.
    pub fn is_playing(&self) -> bool {
        matches!(self.slot, Slot::Playing { .. })
    }

    pub fn is_gated(&self) -> bool {
        matches!(self.slot, Slot::Gated)
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Sequence numbers still queued, head first.
    pub fn queued_sequence(&self) -> Vec<u64> {
        self.queue.sequence()
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        let (status, current_seq) = match &self.slot {
            Slot::Idle => (PlayerStatus::Idle, None),
            Slot::Playing { seq, .. } => (PlayerStatus::Playing, Some(*seq)),
            Slot::Cooldown(_) => (PlayerStatus::Recovering, None),
            Slot::Gated => (PlayerStatus::WaitingForPermission, None),
            Slot::Disabled(reason) => (PlayerStatus::Unavailable(reason.clone()), None),
        };
        PlayerSnapshot {
            status,
            queued: self.queue.len(),
            current_seq,
        }
    }

    fn current_ticket(&self) -> Option<SessionTicket> {
        match self.slot {
            Slot::Playing { ticket, .. } => Some(ticket),
            _ => None,
        }
    }

    /// Release the session, then either freeze (autoplay block, fragment
    /// kept) or skip the fragment and continue after the retry delay.
    fn on_fault(&mut self, ticket: SessionTicket, kind: FaultKind) {
        let seq = match std::mem::replace(&mut self.slot, Slot::Idle) {
            Slot::Playing { seq, session, .. } => {
                drop(session);
                Some(seq)
            }
            other => {
                self.slot = other;
                None
            }
        };

        if kind.is_autoplay_block() {
            info!("Playback blocked by autoplay policy, waiting for the user");
            self.enter_gate();
            return;
        }

        warn!("Skipping fragment {:?} after {}", seq, kind);
        self.queue.pop_front();
        self.enter_cooldown(ticket);
    }

    fn enter_cooldown(&mut self, ticket: SessionTicket) {
        self.slot = Slot::Cooldown(ticket);
        self.scheduler
            .schedule(self.config.retry_delay(), PlayerEvent::CooldownElapsed(ticket));
    }

    fn enter_gate(&mut self) {
        self.slot = Slot::Gated;
        self.gate.show_prompt();
    }

    fn disable(&mut self, e: SurfaceError) {
        error!("{}", e);
        self.queue.clear();
        self.slot = Slot::Disabled(e.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Default)]
    struct NullSurface {
        opened: Vec<u64>,
    }

    impl PlaybackSurface for NullSurface {
        type Session = ();

        fn open(&mut self, _: SessionTicket, fragment: &Fragment) -> Result<(), SurfaceError> {
            self.opened.push(fragment.seq());
            Ok(())
        }

        fn start(&mut self, _: &mut ()) -> Result<(), FaultKind> {
            Ok(())
        }

        fn warm_up(&mut self) {}
    }

    struct OpenGate;

    impl InteractionGate for OpenGate {
        fn permission_likely_expired(&self) -> bool {
            false
        }
        fn record_interaction(&mut self) {}
        fn show_prompt(&mut self) {}
        fn hide_prompt(&mut self) {}
    }

    #[derive(Default)]
    struct Timers(Vec<(Duration, PlayerEvent)>);

    impl Scheduler for Timers {
        fn schedule(&mut self, delay: Duration, event: PlayerEvent) {
            self.0.push((delay, event));
        }
    }

    fn player() -> StreamPlayer<NullSurface, OpenGate, Timers> {
        StreamPlayer::new(
            PlayerConfig::default(),
            NullSurface::default(),
            OpenGate,
            Timers::default(),
        )
    }

    #[test]
    fn test_enqueue_when_idle_starts_playback() {
        let mut p = player();
        p.enqueue(Fragment::new(vec![1u8]));
        assert!(p.is_playing());
        assert_eq!(p.surface.opened, vec![1]);
        assert_eq!(p.snapshot().current_seq, Some(1));
    }

    #[test]
    fn test_enqueue_while_playing_waits() {
        let mut p = player();
        p.enqueue(Fragment::new(vec![1u8]));
        p.enqueue(Fragment::new(vec![2u8]));
        assert_eq!(p.surface.opened, vec![1]);
        assert_eq!(p.queued_sequence(), vec![1, 2]);
    }

    #[test]
    fn test_empty_fragment_ignored() {
        let mut p = player();
        p.enqueue(Fragment::new(Vec::<u8>::new()));
        assert_eq!(p.queue_len(), 0);
        assert!(!p.is_playing());
    }

    #[test]
    fn test_play_next_is_noop_while_playing() {
        let mut p = player();
        p.enqueue(Fragment::new(vec![1u8]));
        p.enqueue(Fragment::new(vec![2u8]));
        p.play_next();
        assert_eq!(p.surface.opened, vec![1]);
    }

    #[test]
    fn test_snapshot_default_is_idle() {
        let p = player();
        assert_eq!(p.snapshot(), PlayerSnapshot::default());
    }
}
