//! Mapping radio-layer failures into the core taxonomy
//!
//! btleplug reports one error type for every operation; the session taxonomy
//! cares which stage failed. Each helper tags a failure with its stage so the
//! consumer can tell a dead link from a missing characteristic.

use std::fmt::Display;

use carlink_core::{CarlinkError, ConnectError};

pub(crate) fn scan_failed(err: impl Display) -> CarlinkError {
    CarlinkError::ScanFailed(err.to_string())
}

pub(crate) fn link_failed(err: impl Display) -> CarlinkError {
    ConnectError::LinkFailed(err.to_string()).into()
}

pub(crate) fn discovery_failed(err: impl Display) -> CarlinkError {
    ConnectError::DiscoveryFailed(err.to_string()).into()
}

pub(crate) fn subscription_failed(err: impl Display) -> CarlinkError {
    CarlinkError::SubscriptionFailed(err.to_string())
}

pub(crate) fn write_failed(err: impl Display) -> CarlinkError {
    CarlinkError::WriteFailed(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helpers_tag_the_failing_stage() {
        assert!(matches!(scan_failed("x"), CarlinkError::ScanFailed(_)));
        assert!(matches!(
            link_failed("x"),
            CarlinkError::Connect(ConnectError::LinkFailed(_))
        ));
        assert!(matches!(
            discovery_failed("x"),
            CarlinkError::Connect(ConnectError::DiscoveryFailed(_))
        ));
        assert!(matches!(
            subscription_failed("x"),
            CarlinkError::SubscriptionFailed(_)
        ));
        assert!(matches!(write_failed("x"), CarlinkError::WriteFailed(_)));
    }
}
