//! Boundary with the fragment producer.
//!
//! The transport hands over one base64 payload per fragment, already lifted
//! out of its wire framing. One call here is one enqueue, in receipt order.

use base64::Engine;

use crate::{Fragment, IngestError};

/// Decode a producer payload into a fragment.
pub fn decode_payload(payload: Option<&str>) -> Result<Fragment, IngestError> {
    let payload = payload.map(str::trim).unwrap_or_default();
    if payload.is_empty() {
        return Err(IngestError::Empty);
    }

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(IngestError::encoding)?;
    if bytes.is_empty() {
        return Err(IngestError::Empty);
    }

    Ok(Fragment::new(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_valid_payload() {
        let f = decode_payload(Some("UklGRg==")).unwrap();
        assert_eq!(f.bytes(), b"RIFF");
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        let f = decode_payload(Some("  UklGRg==\n")).unwrap();
        assert_eq!(f.bytes(), b"RIFF");
    }

    #[test]
    fn test_none_and_empty_rejected() {
        assert_eq!(decode_payload(None), Err(IngestError::Empty));
        assert_eq!(decode_payload(Some("")), Err(IngestError::Empty));
        assert_eq!(decode_payload(Some("   ")), Err(IngestError::Empty));
    }

    #[test]
    fn test_invalid_base64_rejected() {
        assert!(matches!(
            decode_payload(Some("not base64!")),
            Err(IngestError::Encoding(_))
        ));
    }
}
