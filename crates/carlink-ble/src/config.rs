//! Session configuration

use std::time::Duration;

use uuid::Uuid;

// ----------------------------------------------------------------------------
// Configuration
// ----------------------------------------------------------------------------

/// Advertised name of the stock peripheral firmware.
pub const DEFAULT_DEVICE_NAME: &str = "ControlCar";

/// HM-10 style serial service exposed by the peripheral.
pub const DEFAULT_SERVICE_UUID: Uuid = Uuid::from_u128(0x0000FFE0_0000_1000_8000_00805F9B34FB);

/// Single characteristic carrying telemetry notifications and flag writes.
pub const DEFAULT_CHARACTERISTIC_UUID: Uuid =
    Uuid::from_u128(0x0000FFE1_0000_1000_8000_00805F9B34FB);

/// Configuration for one Carlink session.
///
/// All three targets are deployment constants, not runtime negotiation. UUIDs
/// are held in binary form, so lookups match regardless of the case the
/// peripheral reports them in.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SessionConfig {
    /// Advertised local name the scanner matches on
    pub device_name: String,
    /// Target telemetry service
    pub service_uuid: Uuid,
    /// Target telemetry characteristic within that service
    pub characteristic_uuid: Uuid,
    /// Maximum time for the GATT connect and discovery steps. Scanning is
    /// deliberately unbounded; it runs until a match or an explicit stop.
    pub connect_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            device_name: DEFAULT_DEVICE_NAME.to_string(),
            service_uuid: DEFAULT_SERVICE_UUID,
            characteristic_uuid: DEFAULT_CHARACTERISTIC_UUID,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl SessionConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the advertised device name to match
    pub fn with_device_name(mut self, name: String) -> Self {
        self.device_name = name;
        self
    }

    /// Set the target service UUID
    pub fn with_service_uuid(mut self, uuid: Uuid) -> Self {
        self.service_uuid = uuid;
        self
    }

    /// Set the target characteristic UUID
    pub fn with_characteristic_uuid(mut self, uuid: Uuid) -> Self {
        self.characteristic_uuid = uuid;
        self
    }

    /// Set the connect/discovery timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_the_stock_firmware() {
        let config = SessionConfig::default();
        assert_eq!(config.device_name, "ControlCar");
        assert_eq!(
            config.service_uuid.to_string(),
            "0000ffe0-0000-1000-8000-00805f9b34fb"
        );
        assert_eq!(
            config.characteristic_uuid.to_string(),
            "0000ffe1-0000-1000-8000-00805f9b34fb"
        );
    }

    #[test]
    fn uuid_match_is_case_insensitive() {
        // Configuration supplied in uppercase resolves to the same UUID the
        // radio layer reports in lowercase.
        let upper = Uuid::parse_str("0000FFE0-0000-1000-8000-00805F9B34FB").unwrap();
        assert_eq!(upper, DEFAULT_SERVICE_UUID);
    }

    #[test]
    fn builders_override_each_field() {
        let config = SessionConfig::new()
            .with_device_name("Magical_Car".to_string())
            .with_connect_timeout(Duration::from_secs(3));
        assert_eq!(config.device_name, "Magical_Car");
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.service_uuid, DEFAULT_SERVICE_UUID);
    }
}
