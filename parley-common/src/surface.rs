//! Seams between the engine and the runtime it plays into.
//!
//! The engine never calls back into itself from these traits: anything that
//! happens later (playback finished, play() rejected, a timer fired) comes
//! back as a [`PlayerEvent`] that the host feeds to
//! [`StreamPlayer::handle`](crate::StreamPlayer::handle).

use std::fmt;
use std::time::Duration;

use crate::{FaultKind, Fragment, SurfaceError};

/// Identifies one playback attempt. Events carrying an old ticket are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionTicket(u64);

impl SessionTicket {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for SessionTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Asynchronous outcomes reported back to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    /// The surface finished playing the session's fragment
    Ended(SessionTicket),
    /// The surface failed to start or to keep playing
    Faulted {
        ticket: SessionTicket,
        kind: FaultKind,
    },
    /// The pause after a failed fragment is over
    CooldownElapsed(SessionTicket),
    /// The per-session watchdog ran out
    WatchdogFired(SessionTicket),
}

/// The audio rendering primitive.
pub trait PlaybackSurface {
    /// Everything one playback attempt holds on to (element, source handle,
    /// listeners). Dropping it must release all of it.
    type Session;

    /// Create a fresh surface for `fragment`, derive its source and attach it.
    /// The session reports its outcome later as `Ended`/`Faulted` events
    /// tagged with `ticket`.
    fn open(
        &mut self,
        ticket: SessionTicket,
        fragment: &Fragment,
    ) -> Result<Self::Session, SurfaceError>;

    /// Request playback. A synchronous refusal is returned directly; an
    /// asynchronous one arrives as `PlayerEvent::Faulted`.
    fn start(&mut self, session: &mut Self::Session) -> Result<(), FaultKind>;

    /// Play something silent so the runtime re-arms playback permission
    /// while a user gesture is still fresh.
    fn warm_up(&mut self);
}

/// Tracks user gestures and owns the "enable audio" affordance.
pub trait InteractionGate {
    /// Whether playback would likely be refused right now
    fn permission_likely_expired(&self) -> bool;

    fn record_interaction(&mut self);

    fn show_prompt(&mut self);

    fn hide_prompt(&mut self);
}

/// Delivers an event back to the engine after a delay.
pub trait Scheduler {
    fn schedule(&mut self, delay: Duration, event: PlayerEvent);
}
