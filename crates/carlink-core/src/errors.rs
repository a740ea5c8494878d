//! Error taxonomy shared across the Carlink engine
//!
//! Every failure in the engine is one of these variants. None of them are
//! fatal to the process: the session reports the error on its event channel
//! and simply does not progress past the failing stage. Whether to retry the
//! whole session is the consumer's call.

use thiserror::Error;

// ----------------------------------------------------------------------------
// Connection Errors
// ----------------------------------------------------------------------------

/// Failures along the connect → discover → resolve → subscribe pipeline.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("failed to open GATT link: {0}")]
    LinkFailed(String),

    #[error("service discovery failed: {0}")]
    DiscoveryFailed(String),

    #[error("service {uuid} not found on peripheral")]
    ServiceNotFound { uuid: String },

    #[error("characteristic {uuid} not found in target service")]
    CharacteristicNotFound { uuid: String },
}

// ----------------------------------------------------------------------------
// Top-Level Error Type
// ----------------------------------------------------------------------------

/// Errors reported on a session's event channel.
#[derive(Debug, Error)]
pub enum CarlinkError {
    #[error("required capabilities were not granted")]
    PermissionDenied,

    #[error("scan failed: {0}")]
    ScanFailed(String),

    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("failed to subscribe to notifications: {0}")]
    SubscriptionFailed(String),

    #[error("telemetry frame parse failed: {0}")]
    FrameParse(String),

    #[error("characteristic write failed: {0}")]
    WriteFailed(String),
}

pub type Result<T> = core::result::Result<T, CarlinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_error_converts_to_session_error() {
        let err: CarlinkError = ConnectError::ServiceNotFound {
            uuid: "ffe0".into(),
        }
        .into();
        assert!(matches!(
            err,
            CarlinkError::Connect(ConnectError::ServiceNotFound { .. })
        ));
    }

    #[test]
    fn error_messages_name_the_failing_stage() {
        let err = CarlinkError::ScanFailed("adapter gone".into());
        assert_eq!(err.to_string(), "scan failed: adapter gone");
    }
}
