//! Wire-frame codec for the fog → cloud exchange.
//!
//! A frame is `payload-bytes || metadata-json`: the encoded window payload,
//! the two-byte ASCII separator `||`, and the UTF-8 JSON metadata text. The
//! split is on the *first* occurrence of the separator. The separator is not
//! escaped, so a payload that happens to contain `||` loses its tail to the
//! metadata side; this is a known limitation of the protocol and fixing it
//! requires a coordinated change on both tiers.

/// Two-byte separator between payload and metadata.
pub const SEPARATOR: &[u8] = b"||";

/// Literal reply sent by the cloud for a frame without a separator.
pub const FORMAT_ERROR_REPLY: &[u8] = b"FormatError";

/// Error type for frame decoding failures.
#[derive(Debug, PartialEq, Eq)]
pub enum FrameError {
    /// The frame contains no `||` separator.
    MissingSeparator,
}

impl std::fmt::Display for FrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameError::MissingSeparator => write!(f, "frame is missing the '||' separator"),
        }
    }
}

impl std::error::Error for FrameError {}

/// Join an encoded payload and its metadata JSON into a wire frame.
pub fn encode(payload: &[u8], metadata_json: &str) -> Vec<u8> {
    let mut frame = Vec::with_capacity(payload.len() + SEPARATOR.len() + metadata_json.len());
    frame.extend_from_slice(payload);
    frame.extend_from_slice(SEPARATOR);
    frame.extend_from_slice(metadata_json.as_bytes());
    frame
}

/// Split a wire frame into `(payload, metadata)` on the first separator.
pub fn split(frame: &[u8]) -> Result<(&[u8], &[u8]), FrameError> {
    let pos = frame
        .windows(SEPARATOR.len())
        .position(|window| window == SEPARATOR)
        .ok_or(FrameError::MissingSeparator)?;
    Ok((&frame[..pos], &frame[pos + SEPARATOR.len()..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_round_trip() {
        let frame = encode(b"ABC", "{\"x\":1}");
        assert_eq!(frame, b"ABC||{\"x\":1}");
        let (payload, metadata) = split(&frame).unwrap();
        assert_eq!(payload, b"ABC");
        assert_eq!(metadata, b"{\"x\":1}");
    }

    #[test]
    fn missing_separator_is_rejected() {
        assert_eq!(split(b"no separator here"), Err(FrameError::MissingSeparator));
        assert_eq!(split(b""), Err(FrameError::MissingSeparator));
        // A single pipe is not a separator
        assert_eq!(split(b"a|b"), Err(FrameError::MissingSeparator));
    }

    #[test]
    fn split_is_first_occurrence() {
        // A payload containing the separator loses its tail to the metadata
        // side: documented protocol limitation.
        let frame = encode(b"A||B", "{}");
        let (payload, metadata) = split(&frame).unwrap();
        assert_eq!(payload, b"A");
        assert_eq!(metadata, b"B||{}");
    }

    #[test]
    fn empty_payload_and_metadata() {
        let (payload, metadata) = split(b"||").unwrap();
        assert!(payload.is_empty());
        assert!(metadata.is_empty());
    }
}
