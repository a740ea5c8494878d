//! GATT connection lifecycle and subscription
//!
//! One manager owns at most one peripheral link. Every step of the connect
//! pipeline is a suspension point and a distinct failure point, reported
//! through its own [`ConnectError`](carlink_core::ConnectError) variant.

use std::pin::Pin;

use btleplug::api::{Characteristic, Peripheral as _, ValueNotification};
use btleplug::platform::Peripheral;
use futures::stream::{Stream, StreamExt};
use tokio::time::timeout;
use tracing::{info, warn};

use carlink_core::{ConnectError, Result};

use crate::config::SessionConfig;
use crate::error::{discovery_failed, link_failed, subscription_failed};

// ----------------------------------------------------------------------------
// Subscription
// ----------------------------------------------------------------------------

/// Live notification subscription on the telemetry characteristic.
///
/// Exposes the inbound fragment stream and the write target for the outbound
/// flag. Invalidated naturally by disconnect: the stream ends and writes
/// start failing.
pub struct Subscription {
    peripheral: Peripheral,
    characteristic: Characteristic,
    notifications: Pin<Box<dyn Stream<Item = ValueNotification> + Send>>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("peripheral", &self.peripheral)
            .field("characteristic", &self.characteristic)
            .finish_non_exhaustive()
    }
}

impl Subscription {
    /// Next raw notification payload, in strict arrival order.
    ///
    /// `None` once the underlying link is gone. Notifications from other
    /// characteristics on the same peripheral are skipped.
    pub async fn next_fragment(&mut self) -> Option<Vec<u8>> {
        while let Some(notification) = self.notifications.next().await {
            if notification.uuid == self.characteristic.uuid {
                return Some(notification.value);
            }
        }
        None
    }

    /// Handles the outbound writer needs to address the characteristic.
    pub fn write_target(&self) -> (Peripheral, Characteristic) {
        (self.peripheral.clone(), self.characteristic.clone())
    }
}

// ----------------------------------------------------------------------------
// Connection Manager
// ----------------------------------------------------------------------------

/// Owns the lifecycle of the single peripheral connection.
pub struct ConnectionManager {
    config: SessionConfig,
    peripheral: Option<Peripheral>,
}

impl ConnectionManager {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            peripheral: None,
        }
    }

    /// Whether a GATT link is currently held.
    pub fn has_link(&self) -> bool {
        self.peripheral.is_some()
    }

    /// Step 1: open the GATT connection. The handle is retained so a later
    /// `disconnect` can tear it down even if the remaining steps fail.
    pub async fn open_link(&mut self, peripheral: Peripheral) -> Result<()> {
        match timeout(self.config.connect_timeout, peripheral.connect()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(link_failed(e)),
            Err(_) => {
                return Err(link_failed(format!(
                    "connect timed out after {:?}",
                    self.config.connect_timeout
                )))
            }
        }
        info!("GATT link open");
        self.peripheral = Some(peripheral);
        Ok(())
    }

    /// Steps 2-5: discover services, resolve the configured service and
    /// characteristic, and subscribe to value-change notifications.
    pub async fn subscribe(&mut self) -> Result<Subscription> {
        let peripheral = self
            .peripheral
            .as_ref()
            .ok_or_else(|| link_failed("no open link"))?;

        match timeout(self.config.connect_timeout, peripheral.discover_services()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(discovery_failed(e)),
            Err(_) => {
                return Err(discovery_failed(format!(
                    "discovery timed out after {:?}",
                    self.config.connect_timeout
                )))
            }
        }

        let service = peripheral
            .services()
            .into_iter()
            .find(|s| s.uuid == self.config.service_uuid)
            .ok_or_else(|| ConnectError::ServiceNotFound {
                uuid: self.config.service_uuid.to_string(),
            })?;

        let characteristic = service
            .characteristics
            .into_iter()
            .find(|c| c.uuid == self.config.characteristic_uuid)
            .ok_or_else(|| ConnectError::CharacteristicNotFound {
                uuid: self.config.characteristic_uuid.to_string(),
            })?;
        info!(characteristic = %characteristic.uuid, "telemetry characteristic resolved");

        peripheral
            .subscribe(&characteristic)
            .await
            .map_err(subscription_failed)?;
        let notifications = peripheral
            .notifications()
            .await
            .map_err(subscription_failed)?;

        Ok(Subscription {
            peripheral: peripheral.clone(),
            characteristic,
            notifications,
        })
    }

    /// Tear down the GATT link if one is open.
    ///
    /// Idempotent: calling it twice, or before any connect, is a no-op. A
    /// failed radio-side disconnect is logged and swallowed; the handle is
    /// released either way.
    pub async fn disconnect(&mut self) {
        if let Some(peripheral) = self.peripheral.take() {
            if let Err(e) = peripheral.disconnect().await {
                warn!("peripheral disconnect failed: {}", e);
            }
            info!("GATT link closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disconnect_before_connect_is_a_no_op() {
        let mut manager = ConnectionManager::new(SessionConfig::default());
        assert!(!manager.has_link());
        manager.disconnect().await;
        assert!(!manager.has_link());
    }

    #[tokio::test]
    async fn disconnect_is_idempotent() {
        let mut manager = ConnectionManager::new(SessionConfig::default());
        manager.disconnect().await;
        manager.disconnect().await;
        assert!(!manager.has_link());
    }

    #[tokio::test]
    async fn subscribe_without_link_reports_link_failure() {
        let mut manager = ConnectionManager::new(SessionConfig::default());
        let err = manager.subscribe().await.unwrap_err();
        assert!(matches!(
            err,
            carlink_core::CarlinkError::Connect(ConnectError::LinkFailed(_))
        ));
    }
}
