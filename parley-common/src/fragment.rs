use std::fmt;
use std::sync::Arc;

/// One self-contained, independently playable unit of encoded audio.
///
/// The payload is opaque to the engine; only the playback surface knows how to
/// turn it into something audible. Cloning is cheap (the bytes are shared), so
/// a surface can hold on to the payload for the lifetime of its session.
#[derive(Clone, PartialEq, Eq)]
pub struct Fragment {
    seq: u64,
    bytes: Arc<[u8]>,
}

impl Fragment {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            seq: 0,
            bytes: bytes.into(),
        }
    }

    /// Arrival position, assigned by the queue when the fragment is enqueued.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub(crate) fn stamped(mut self, seq: u64) -> Self {
        self.seq = seq;
        self
    }
}

impl fmt::Debug for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fragment")
            .field("seq", &self.seq)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl From<Vec<u8>> for Fragment {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_fragment_is_unstamped() {
        let f = Fragment::new(vec![1u8, 2, 3]);
        assert_eq!(f.seq(), 0);
        assert_eq!(f.len(), 3);
        assert!(!f.is_empty());
    }

    #[test]
    fn test_debug_hides_payload() {
        let f = Fragment::new(vec![0u8; 4096]).stamped(7);
        assert_eq!(format!("{f:?}"), "Fragment { seq: 7, len: 4096 }");
    }

    #[test]
    fn test_clone_shares_bytes() {
        let f = Fragment::from(vec![9u8; 16]);
        let g = f.clone();
        assert!(std::ptr::eq(f.bytes().as_ptr(), g.bytes().as_ptr()));
    }
}
