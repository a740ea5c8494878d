//! Core telemetry protocol for the Carlink BLE control loop
//!
//! This crate holds everything about the wire protocol that does not touch a
//! radio: the decoded telemetry model, the session error taxonomy, and the
//! codec for both directions of the link.
//!
//! ## Modules
//!
//! - [`types`] - Telemetry samples, connection states, and session events
//! - [`errors`] - Error taxonomy shared across the engine
//! - [`frame`] - Fragment reassembly and outbound flag encoding
//!
//! The peripheral streams UTF-8 JSON objects (`{"x": <number>, "y": <number>}`)
//! split across notification-sized fragments; [`frame::FrameReassembler`]
//! rebuilds them. The controller answers with a single base64-encoded ASCII
//! digit produced by [`frame::encode_flag`].

pub mod errors;
pub mod frame;
pub mod types;

// Public API exports
pub use errors::{CarlinkError, ConnectError, Result};
pub use frame::{encode_flag, FrameReassembler};
pub use types::{ConnectionState, Sample, SessionEvent};
