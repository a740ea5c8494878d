//! Process-wide radio manager lifecycle

use btleplug::api::Manager as _;
use btleplug::platform::{Adapter, Manager};
use tracing::info;

use carlink_core::Result;

use crate::error::scan_failed;

// ----------------------------------------------------------------------------
// Radio Handle
// ----------------------------------------------------------------------------

/// Handle on the host's BLE stack.
///
/// The underlying manager is a process-wide resource: acquire one `Radio` and
/// hand it to a single session. Only one scan or connection sequence may run
/// through it at a time, which the session controller enforces by owning the
/// radio for its whole lifetime. Dropping the `Radio` releases the stack.
pub struct Radio {
    _manager: Manager,
    adapter: Adapter,
}

impl Radio {
    /// Acquire the radio stack and its first adapter.
    pub async fn acquire() -> Result<Self> {
        let manager = Manager::new().await.map_err(scan_failed)?;

        let adapters = manager.adapters().await.map_err(scan_failed)?;
        let adapter = adapters
            .into_iter()
            .next()
            .ok_or_else(|| scan_failed("no BLE adapters available"))?;

        info!("BLE adapter acquired");
        Ok(Self {
            _manager: manager,
            adapter,
        })
    }

    /// Adapter used for scanning and connection.
    pub fn adapter(&self) -> &Adapter {
        &self.adapter
    }
}
