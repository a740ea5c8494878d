//! Bluetooth Low Energy session engine for Carlink
//!
//! This crate drives one control-loop session against a tilt-telemetry
//! peripheral: discover it by advertised name, open a GATT link, resolve the
//! telemetry service and characteristic, subscribe to notifications, and
//! write the event flag back with an acknowledged write.
//!
//! ## Architecture
//!
//! - [`config`] - Session configuration (target name, UUIDs, timeout)
//! - [`permissions`] - Runtime capability gate
//! - [`radio`] - Process-wide radio manager lifecycle
//! - [`scanner`] - Device discovery with in-process name filtering
//! - [`connection`] - GATT connection lifecycle and subscription
//! - [`writer`] - Outbound event-flag delivery
//! - [`session`] - Session controller composing the above
//!
//! ## Usage
//!
//! ```rust,no_run
//! use carlink_ble::{CarSession, SessionConfig};
//! use carlink_core::SessionEvent;
//!
//! # async fn example() {
//! let config = SessionConfig::default().with_device_name("ControlCar".to_string());
//! let (session, mut handle) = CarSession::new(config);
//! let mut events = handle.take_events().expect("events not yet taken");
//!
//! tokio::spawn(session.run());
//!
//! while let Some(event) = events.recv().await {
//!     if let SessionEvent::Sample(sample) = event {
//!         println!("x={} y={}", sample.x, sample.y);
//!     }
//! }
//! # }
//! ```
//!
//! A session owns the radio exclusively: at most one scan and one peripheral
//! connection exist at a time, and teardown is safe to request from any
//! state.

pub mod config;
pub mod connection;
mod error;
pub mod permissions;
pub mod radio;
pub mod scanner;
pub mod session;
pub mod writer;

// Public API exports
pub use config::SessionConfig;
pub use connection::{ConnectionManager, Subscription};
pub use permissions::{Capability, CapabilityGate, NoPromptGate, PermissionGate};
pub use radio::Radio;
pub use scanner::{name_matches, Scanner};
pub use session::{CarSession, SessionHandle};
pub use writer::OutboundWriter;
