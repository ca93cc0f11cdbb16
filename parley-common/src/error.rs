//! Error types for the playback core
use thiserror::Error;

/// Why a payload handed over by the producer was not enqueued
#[derive(Error, Debug, PartialEq, Eq)]
pub enum IngestError {
    /// `None`, empty or whitespace-only payload
    #[error("Empty fragment payload")]
    Empty,
    /// Payload is not valid base64
    #[error("Invalid base64 payload: {0}")]
    Encoding(String),
}

impl IngestError {
    pub fn encoding(e: impl std::fmt::Display) -> Self {
        Self::Encoding(e.to_string())
    }
}

/// Errors raised by a playback surface while acquiring a session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// The fragment could not be turned into a playable source (blob, URL, ...)
    #[error("Failed to create audio source: {0}")]
    Source(String),
    /// The surface element could not be created or attached
    #[error("Failed to create audio element: {0}")]
    Element(String),
    /// The environment has no audio playback at all; never retried
    #[error("Audio playback unavailable: {0}")]
    Unavailable(String),
}

impl SurfaceError {
    pub fn source(e: impl std::fmt::Display) -> Self {
        Self::Source(e.to_string())
    }
    pub fn element(e: impl std::fmt::Display) -> Self {
        Self::Element(e.to_string())
    }
    pub fn unavailable(e: impl std::fmt::Display) -> Self {
        Self::Unavailable(e.to_string())
    }

    /// Whether the next fragment could plausibly succeed where this one failed
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::Unavailable(_))
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Configuration error: {0}")]
    Config(String),
}
