//! Runtime capability gate
//!
//! Some host platforms require an explicit runtime grant before any radio
//! operation; others expose the radio unconditionally. The gate resolves to a
//! plain boolean and never errors past its boundary. There is no retry: the
//! caller decides whether to proceed on denial, and the stock session
//! proceeds regardless, logging the denial.

use async_trait::async_trait;
use tracing::{debug, warn};

// ----------------------------------------------------------------------------
// Capabilities
// ----------------------------------------------------------------------------

/// Radio capabilities a platform may gate behind a runtime grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Permission to run a discovery scan
    Scan,
    /// Permission to open a GATT connection
    Connect,
    /// Location access, required for scanning on older permission models
    FineLocation,
}

/// Platform version at which the split scan/connect permission model
/// replaces the single location-adjacent grant.
pub const MODERN_PERMISSION_API_LEVEL: u32 = 31;

/// Capability set to request for a given platform version.
///
/// `None` means the platform has no runtime grant model at all, so nothing
/// needs requesting. Below the threshold a single location capability covers
/// scanning; at or above it, all three capabilities must be granted.
pub fn required_capabilities(api_level: Option<u32>) -> &'static [Capability] {
    match api_level {
        None => &[],
        Some(level) if level < MODERN_PERMISSION_API_LEVEL => &[Capability::FineLocation],
        Some(_) => &[
            Capability::Scan,
            Capability::Connect,
            Capability::FineLocation,
        ],
    }
}

// ----------------------------------------------------------------------------
// Gate
// ----------------------------------------------------------------------------

/// Platform hook that answers a single capability request.
///
/// Returning `false` covers both an explicit denial and a failed request;
/// the distinction does not change what the session can do.
#[async_trait]
pub trait CapabilityGate: Send + Sync {
    async fn request(&self, capability: Capability) -> bool;
}

/// Gate for platforms that expose the radio without a runtime dialog.
pub struct NoPromptGate;

#[async_trait]
impl CapabilityGate for NoPromptGate {
    async fn request(&self, _capability: Capability) -> bool {
        true
    }
}

/// Requests every capability the platform version demands.
pub struct PermissionGate<G: CapabilityGate> {
    gate: G,
    api_level: Option<u32>,
}

impl PermissionGate<NoPromptGate> {
    /// Gate for the current host. Desktop radio stacks have no runtime
    /// permission dialog, so nothing is requested and the result is `true`.
    pub fn for_platform() -> Self {
        Self::new(NoPromptGate, None)
    }
}

impl<G: CapabilityGate> PermissionGate<G> {
    pub fn new(gate: G, api_level: Option<u32>) -> Self {
        Self { gate, api_level }
    }

    /// Request every required capability; `true` only if ALL are granted.
    pub async fn request_capabilities(&self) -> bool {
        let required = required_capabilities(self.api_level);
        if required.is_empty() {
            debug!("platform requires no runtime capability grant");
            return true;
        }

        for capability in required {
            if !self.gate.request(*capability).await {
                warn!(?capability, "capability request denied");
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DenyGate(Capability);

    #[async_trait]
    impl CapabilityGate for DenyGate {
        async fn request(&self, capability: Capability) -> bool {
            capability != self.0
        }
    }

    #[test]
    fn legacy_platforms_request_location_only() {
        assert_eq!(required_capabilities(Some(30)), &[Capability::FineLocation]);
    }

    #[test]
    fn modern_platforms_request_all_three() {
        assert_eq!(
            required_capabilities(Some(31)),
            &[
                Capability::Scan,
                Capability::Connect,
                Capability::FineLocation
            ]
        );
    }

    #[test]
    fn ungated_platforms_request_nothing() {
        assert!(required_capabilities(None).is_empty());
    }

    #[tokio::test]
    async fn any_denial_fails_the_whole_request() {
        let gate = PermissionGate::new(DenyGate(Capability::Connect), Some(33));
        assert!(!gate.request_capabilities().await);
    }

    #[tokio::test]
    async fn denied_capability_outside_the_required_set_is_irrelevant() {
        // Legacy tier never asks for Connect, so denying it changes nothing.
        let gate = PermissionGate::new(DenyGate(Capability::Connect), Some(29));
        assert!(gate.request_capabilities().await);
    }

    #[tokio::test]
    async fn platform_gate_always_grants() {
        assert!(PermissionGate::for_platform().request_capabilities().await);
    }
}
