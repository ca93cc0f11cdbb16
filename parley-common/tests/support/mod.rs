//! Fakes for driving the playback engine without a browser
#![allow(dead_code)]

use parley_common::{
    FaultKind, Fragment, InteractionGate, PlaybackSurface, PlayerConfig, PlayerEvent, Scheduler,
    SessionTicket, StreamPlayer, SurfaceError,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

/// Initialize tracing for tests with proper test output handling
pub fn tracing_init() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_line_number(true)
        .with_target(false)
        .with_file(true)
        .try_init();
}

/// What the engine asked the surface to do, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    Open { seq: u64, ticket: SessionTicket },
    Start(SessionTicket),
    Release(SessionTicket),
    WarmUp,
}

#[derive(Default)]
struct SurfaceState {
    calls: Vec<SurfaceCall>,
    live: usize,
    max_live: usize,
    open_errors: HashMap<u64, SurfaceError>,
    start_refusals: HashMap<u64, FaultKind>,
}

/// Records every call; sessions report their release on drop.
#[derive(Clone, Default)]
pub struct FakeSurface {
    state: Rc<RefCell<SurfaceState>>,
}

pub struct FakeSession {
    ticket: SessionTicket,
    seq: u64,
    state: Rc<RefCell<SurfaceState>>,
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        let mut state = self.state.borrow_mut();
        state.live -= 1;
        state.calls.push(SurfaceCall::Release(self.ticket));
    }
}

impl FakeSurface {
    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.state.borrow().calls.clone()
    }

    /// Sequence numbers in the order they were handed to the surface
    pub fn opened(&self) -> Vec<u64> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                SurfaceCall::Open { seq, .. } => Some(*seq),
                _ => None,
            })
            .collect()
    }

    /// Ticket of the most recently opened session
    pub fn last_ticket(&self) -> SessionTicket {
        self.state
            .borrow()
            .calls
            .iter()
            .rev()
            .find_map(|c| match c {
                SurfaceCall::Open { ticket, .. } => Some(*ticket),
                _ => None,
            })
            .expect("no session was opened")
    }

    pub fn live_sessions(&self) -> usize {
        self.state.borrow().live
    }

    pub fn max_live_sessions(&self) -> usize {
        self.state.borrow().max_live
    }

    pub fn warm_ups(&self) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| **c == SurfaceCall::WarmUp)
            .count()
    }

    pub fn fail_open(&self, seq: u64, error: SurfaceError) {
        self.state.borrow_mut().open_errors.insert(seq, error);
    }

    pub fn refuse_start(&self, seq: u64, kind: FaultKind) {
        self.state.borrow_mut().start_refusals.insert(seq, kind);
    }
}

impl PlaybackSurface for FakeSurface {
    type Session = FakeSession;

    fn open(
        &mut self,
        ticket: SessionTicket,
        fragment: &Fragment,
    ) -> Result<FakeSession, SurfaceError> {
        let mut state = self.state.borrow_mut();
        if let Some(err) = state.open_errors.get(&fragment.seq()) {
            return Err(err.clone());
        }
        state.calls.push(SurfaceCall::Open {
            seq: fragment.seq(),
            ticket,
        });
        state.live += 1;
        state.max_live = state.max_live.max(state.live);
        Ok(FakeSession {
            ticket,
            seq: fragment.seq(),
            state: self.state.clone(),
        })
    }

    fn start(&mut self, session: &mut FakeSession) -> Result<(), FaultKind> {
        let mut state = self.state.borrow_mut();
        state.calls.push(SurfaceCall::Start(session.ticket));
        match state.start_refusals.remove(&session.seq) {
            Some(kind) => Err(kind),
            None => Ok(()),
        }
    }

    fn warm_up(&mut self) {
        self.state.borrow_mut().calls.push(SurfaceCall::WarmUp);
    }
}

#[derive(Default)]
struct GateState {
    expired: bool,
    prompt_visible: bool,
    prompts_shown: usize,
    interactions: usize,
}

/// Gate whose permission state is flipped by the test
#[derive(Clone, Default)]
pub struct FakeGate {
    state: Rc<RefCell<GateState>>,
}

impl FakeGate {
    pub fn set_expired(&self, expired: bool) {
        self.state.borrow_mut().expired = expired;
    }

    pub fn prompt_visible(&self) -> bool {
        self.state.borrow().prompt_visible
    }

    pub fn prompts_shown(&self) -> usize {
        self.state.borrow().prompts_shown
    }

    pub fn interactions(&self) -> usize {
        self.state.borrow().interactions
    }
}

impl InteractionGate for FakeGate {
    fn permission_likely_expired(&self) -> bool {
        self.state.borrow().expired
    }

    fn record_interaction(&mut self) {
        let mut state = self.state.borrow_mut();
        state.interactions += 1;
        state.expired = false;
    }

    fn show_prompt(&mut self) {
        let mut state = self.state.borrow_mut();
        if !state.prompt_visible {
            state.prompts_shown += 1;
        }
        state.prompt_visible = true;
    }

    fn hide_prompt(&mut self) {
        self.state.borrow_mut().prompt_visible = false;
    }
}

/// Timers that only fire when the test says so
#[derive(Clone, Default)]
pub struct ManualScheduler {
    pending: Rc<RefCell<Vec<(Duration, PlayerEvent)>>>,
}

impl ManualScheduler {
    pub fn pending(&self) -> Vec<(Duration, PlayerEvent)> {
        self.pending.borrow().clone()
    }

    pub fn take_all(&self) -> Vec<PlayerEvent> {
        self.pending.borrow_mut().drain(..).map(|(_, e)| e).collect()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration, event: PlayerEvent) {
        self.pending.borrow_mut().push((delay, event));
    }
}

pub type TestPlayer = StreamPlayer<FakeSurface, FakeGate, ManualScheduler>;

pub struct Harness {
    pub player: TestPlayer,
    pub surface: FakeSurface,
    pub gate: FakeGate,
    pub timers: ManualScheduler,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(PlayerConfig::default())
    }

    pub fn with_config(config: PlayerConfig) -> Self {
        tracing_init();
        let surface = FakeSurface::default();
        let gate = FakeGate::default();
        let timers = ManualScheduler::default();
        let player = StreamPlayer::new(config, surface.clone(), gate.clone(), timers.clone());
        Self {
            player,
            surface,
            gate,
            timers,
        }
    }

    pub fn enqueue(&mut self, tag: u8) {
        self.player.enqueue(Fragment::new(vec![tag; 8]));
    }

    /// Report the live session as finished
    pub fn end_current(&mut self) {
        let ticket = self.surface.last_ticket();
        self.player.handle(PlayerEvent::Ended(ticket));
    }

    pub fn fault_current(&mut self, kind: FaultKind) {
        let ticket = self.surface.last_ticket();
        self.player.handle(PlayerEvent::Faulted { ticket, kind });
    }

    /// Fire every pending timer
    pub fn fire_timers(&mut self) {
        for event in self.timers.take_all() {
            self.player.handle(event);
        }
    }
}
