//! parley-common - Platform-independent core of the parley client
//!
//! Holds the streaming speech playback engine and the pure data types around
//! it. Nothing in here touches the DOM: the browser crate plugs its `<audio>`
//! surface, interaction listener and timers in through the traits in
//! [`surface`].

pub mod config;
pub mod error;
pub mod fault;
pub mod fragment;
pub mod fragment_queue;
pub mod ingest;
pub mod interaction;
pub mod scenario;
pub mod stream_message;
pub mod stream_player;
pub mod surface;
pub mod transcript;

pub use config::PlayerConfig;
pub use error::{ConfigError, IngestError, SurfaceError};
pub use fault::FaultKind;
pub use fragment::Fragment;
pub use fragment_queue::FragmentQueue;
pub use interaction::InteractionClock;
pub use scenario::Scenario;
pub use stream_message::StreamMessage;
pub use stream_player::{PlayerSnapshot, PlayerStatus, StreamPlayer};
pub use surface::{InteractionGate, PlaybackSurface, PlayerEvent, Scheduler, SessionTicket};
pub use transcript::{ChatMessage, Role, Transcript};
