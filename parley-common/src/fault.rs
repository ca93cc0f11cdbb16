//! Closed classification of playback faults.
//!
//! Surfaces decide the kind once, at the boundary, from whatever the runtime
//! hands them (a DOM exception name, a `MediaError` code). The engine only ever
//! matches on [`FaultKind`].

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// Playback refused until the user interacts with the page
    AutoplayBlocked,
    /// Fetching or playing the source was aborted
    Aborted,
    Network,
    /// The payload is corrupt or could not be decoded
    Decode,
    /// Format or MIME type not playable by this surface
    UnsupportedSource,
    /// The session neither ended nor faulted within the watchdog timeout
    Stalled,
    Unknown,
}

impl FaultKind {
    /// Map a DOM exception name from a rejected `play()` promise.
    pub fn from_exception_name(name: &str) -> Self {
        match name {
            "NotAllowedError" => Self::AutoplayBlocked,
            "AbortError" => Self::Aborted,
            "NotSupportedError" => Self::UnsupportedSource,
            "NetworkError" => Self::Network,
            "EncodingError" => Self::Decode,
            _ => Self::Unknown,
        }
    }

    /// Map `HTMLMediaElement.error.code` (MEDIA_ERR_*).
    pub fn from_media_error_code(code: u16) -> Self {
        match code {
            1 => Self::Aborted,
            2 => Self::Network,
            3 => Self::Decode,
            4 => Self::UnsupportedSource,
            _ => Self::Unknown,
        }
    }

    /// Autoplay blocks pause the pipeline; everything else skips the fragment.
    pub fn is_autoplay_block(self) -> bool {
        matches!(self, Self::AutoplayBlocked)
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AutoplayBlocked => "autoplay blocked",
            Self::Aborted => "aborted",
            Self::Network => "network error",
            Self::Decode => "decode error",
            Self::UnsupportedSource => "unsupported source",
            Self::Stalled => "stalled",
            Self::Unknown => "unknown error",
        };
        f.write_str(s)
    }
}
