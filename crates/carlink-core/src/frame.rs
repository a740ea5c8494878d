//! Fragment reassembly and outbound flag encoding
//!
//! The peripheral's link MTU is smaller than a telemetry frame, so each JSON
//! object arrives split across several notification payloads. Framing is
//! delimiter-based: a frame is complete once the accumulated bytes contain the
//! JSON object terminator `}`. There is no length prefix and no fragment
//! sequence numbering; fragments are appended strictly in arrival order.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::errors::{CarlinkError, Result};
use crate::types::Sample;

/// Frame terminator. The wire format is a single JSON object per frame, so
/// the closing brace marks the end of a frame.
const FRAME_DELIMITER: u8 = b'}';

// ----------------------------------------------------------------------------
// Frame Reassembly
// ----------------------------------------------------------------------------

/// Rebuilds complete telemetry frames from raw notification fragments.
///
/// The internal buffer holds at most one pending (possibly incomplete) frame;
/// it is reset to empty the moment a complete frame is extracted, whether the
/// parse succeeded or not. A reassembler is bound to one notification stream:
/// buffer state is not shareable, restart by constructing a new instance.
///
/// Two frames concatenated inside one fragment without a delimiter in between
/// would mis-parse; that is an accepted constraint of the wire format.
#[derive(Debug, Default)]
pub struct FrameReassembler {
    buffer: Vec<u8>,
}

impl FrameReassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one fragment and extract a frame if the buffer now holds one.
    ///
    /// Returns `None` while the accumulated buffer has no delimiter yet,
    /// `Some(Ok(sample))` for a complete well-formed frame, and
    /// `Some(Err(_))` when the delimiter arrived but the buffer does not
    /// parse. In both `Some` cases the buffer is left empty; a malformed
    /// frame is discarded, not retried, and does not disturb the frames that
    /// follow it.
    pub fn push(&mut self, fragment: &[u8]) -> Option<Result<Sample>> {
        self.buffer.extend_from_slice(fragment);

        if !self.buffer.contains(&FRAME_DELIMITER) {
            return None;
        }

        let result = serde_json::from_slice::<Sample>(&self.buffer)
            .map_err(|e| CarlinkError::FrameParse(e.to_string()));
        self.buffer.clear();
        Some(result)
    }

    /// Number of buffered bytes still waiting for a delimiter.
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }
}

// ----------------------------------------------------------------------------
// Outbound Encoding
// ----------------------------------------------------------------------------

/// Encode the event flag as the peripheral expects it: the ASCII digit `1`
/// (true) or `0` (false), wrapped in standard base64.
pub fn encode_flag(flag: bool) -> Vec<u8> {
    let digit = if flag { "1" } else { "0" };
    STANDARD.encode(digit).into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_fragment_is_buffered_not_emitted() {
        let mut reassembler = FrameReassembler::new();
        assert!(reassembler.push(br#"{"x":1,"#).is_none());
        assert_eq!(reassembler.pending_len(), 7);
    }

    #[test]
    fn split_frame_emits_exactly_one_sample() {
        let mut reassembler = FrameReassembler::new();
        assert!(reassembler.push(br#"{"x":1,"#).is_none());
        let sample = reassembler.push(br#""y":2}"#).unwrap().unwrap();
        assert_eq!(sample, Sample { x: 1.0, y: 2.0 });
        assert_eq!(reassembler.pending_len(), 0);
    }

    #[test]
    fn single_fragment_frame_emits_immediately() {
        let mut reassembler = FrameReassembler::new();
        let sample = reassembler.push(br#"{"x":-0.25,"y":0.5}"#).unwrap().unwrap();
        assert_eq!(sample, Sample { x: -0.25, y: 0.5 });
    }

    #[test]
    fn malformed_frame_reports_error_and_resets() {
        let mut reassembler = FrameReassembler::new();
        let err = reassembler.push(br#"{"x":1,"y":}"#).unwrap().unwrap_err();
        assert!(matches!(err, CarlinkError::FrameParse(_)));
        assert_eq!(reassembler.pending_len(), 0);

        // The next frame reassembles independently of the failure.
        let sample = reassembler.push(br#"{"x":3,"y":4}"#).unwrap().unwrap();
        assert_eq!(sample, Sample { x: 3.0, y: 4.0 });
    }

    #[test]
    fn invalid_utf8_with_delimiter_is_a_parse_error() {
        let mut reassembler = FrameReassembler::new();
        let err = reassembler.push(&[0xFF, 0xFE, b'}']).unwrap().unwrap_err();
        assert!(matches!(err, CarlinkError::FrameParse(_)));
        assert_eq!(reassembler.pending_len(), 0);
    }

    #[test]
    fn emission_count_matches_delimiter_count() {
        let fragments: [&[u8]; 5] = [
            br#"{"x""#,
            br#":10,"#,
            br#""y":20}"#,
            br#"{"x":30,"#,
            br#""y":40}"#,
        ];
        let mut reassembler = FrameReassembler::new();
        let samples: Vec<Sample> = fragments
            .iter()
            .filter_map(|f| reassembler.push(f))
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(
            samples,
            vec![Sample { x: 10.0, y: 20.0 }, Sample { x: 30.0, y: 40.0 }]
        );
    }

    #[test]
    fn flag_encoding_matches_peripheral_expectation() {
        // base64("1") and base64("0")
        assert_eq!(encode_flag(true), b"MQ==");
        assert_eq!(encode_flag(false), b"MA==");
    }
}
