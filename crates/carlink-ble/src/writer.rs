//! Outbound event-flag delivery

use btleplug::api::{Characteristic, Peripheral as _, WriteType};
use btleplug::platform::Peripheral;
use tracing::debug;

use carlink_core::{encode_flag, Result};

use crate::error::write_failed;

// ----------------------------------------------------------------------------
// Outbound Writer
// ----------------------------------------------------------------------------

/// Delivers the boolean event flag to the peripheral.
///
/// Independent of the inbound stream: a write may be in flight while samples
/// keep arriving, and writes carry no ordering guarantee relative to them.
/// There is no automatic retry; the caller re-invokes `send` on every flag
/// change, so the next change is the natural retry.
#[derive(Default)]
pub struct OutboundWriter {
    target: Option<(Peripheral, Characteristic)>,
}

impl OutboundWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the writer at a live subscription's characteristic.
    pub fn attach(&mut self, peripheral: Peripheral, characteristic: Characteristic) {
        self.target = Some((peripheral, characteristic));
    }

    /// Drop the write target; subsequent sends become no-ops.
    pub fn detach(&mut self) {
        self.target = None;
    }

    /// Encode `flag` and deliver it with an acknowledged write.
    ///
    /// With no active subscription this returns success immediately without
    /// touching the radio; races against teardown are tolerated rather than
    /// failed hard.
    pub async fn send(&self, flag: bool) -> Result<()> {
        let Some((peripheral, characteristic)) = &self.target else {
            debug!(flag, "no active subscription, dropping flag write");
            return Ok(());
        };

        let payload = encode_flag(flag);
        peripheral
            .write(characteristic, &payload, WriteType::WithResponse)
            .await
            .map_err(write_failed)?;
        debug!(flag, "event flag written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_without_subscription_is_a_successful_no_op() {
        let writer = OutboundWriter::new();
        assert!(writer.send(true).await.is_ok());
        assert!(writer.send(false).await.is_ok());
    }

    #[tokio::test]
    async fn detached_writer_behaves_like_a_fresh_one() {
        let mut writer = OutboundWriter::new();
        writer.detach();
        assert!(writer.send(true).await.is_ok());
    }
}
