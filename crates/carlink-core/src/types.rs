//! Telemetry data model and session events

use serde::Deserialize;

use crate::errors::CarlinkError;

// ----------------------------------------------------------------------------
// Telemetry Model
// ----------------------------------------------------------------------------

/// One decoded two-axis tilt/acceleration reading.
///
/// Deserialized from the peripheral's JSON frames; extra fields in a frame are
/// ignored, both axes are required.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
}

// ----------------------------------------------------------------------------
// Connection State
// ----------------------------------------------------------------------------

/// Lifecycle of the single peripheral connection owned by a session.
///
/// Exactly one peripheral handle is live in every state other than `Idle` and
/// `Disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Scanning,
    Connecting,
    DiscoveringCapabilities,
    Subscribed,
    Disconnected,
}

// ----------------------------------------------------------------------------
// Session Events
// ----------------------------------------------------------------------------

/// Events a session publishes to its consumer.
///
/// The consumer callback surface (`onSample` / `onConnectionStateChange` /
/// `onError`) is modeled as a single event channel; every radio-layer failure
/// arrives here as a value and none of them abort the process.
#[derive(Debug)]
pub enum SessionEvent {
    /// One successfully reassembled telemetry frame.
    Sample(Sample),
    /// The connection state machine advanced.
    StateChanged(ConnectionState),
    /// A non-fatal failure; the session does not progress past the failing
    /// stage but keeps any live subscription running.
    Error(CarlinkError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_parses_numeric_fields() {
        let sample: Sample = serde_json::from_str(r#"{"x":1.5,"y":-2}"#).unwrap();
        assert_eq!(sample, Sample { x: 1.5, y: -2.0 });
    }

    #[test]
    fn sample_ignores_unknown_fields() {
        let sample: Sample = serde_json::from_str(r#"{"x":0,"y":0,"z":9}"#).unwrap();
        assert_eq!(sample, Sample { x: 0.0, y: 0.0 });
    }

    #[test]
    fn sample_requires_both_axes() {
        assert!(serde_json::from_str::<Sample>(r#"{"x":1}"#).is_err());
    }
}
