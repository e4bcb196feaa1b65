//! Bridge configuration

use std::time::Duration;

use network_control::DEFAULT_PORT;
use state_store::DEFAULT_MONITOR_TIMEOUT;

use crate::error::BridgeError;

/// Configuration shared by every endpoint of a bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// How long a state-change monitor waits before failing
    /// Default: 3000ms
    pub monitor_timeout: Duration,

    /// How long search-and-play waits for the current playback to stop
    /// Default: 1000ms
    pub stop_timeout: Duration,

    /// Network control port used until the `NetworkControlPort` setting is read
    /// Default: 6546
    pub network_control_port: u16,

    /// Overall timeout of one network control exchange
    /// Default: 5s
    pub network_control_timeout: Duration,

    /// Host setting gating endpoint creation
    /// Default: "AlexaEnabled"
    pub enabled_setting_key: String,

    /// Value of the gating setting when it is unset
    /// Default: "true"
    pub enabled_default: String,

    /// Host setting holding the endpoint's friendly name
    /// Default: "AlexaFriendlyName"
    pub friendly_name_setting_key: String,

    /// Manufacturer used in endpoint ids and metadata
    /// Default: "MythTV"
    pub manufacturer_name: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            monitor_timeout: DEFAULT_MONITOR_TIMEOUT,
            stop_timeout: Duration::from_millis(1000),
            network_control_port: DEFAULT_PORT,
            network_control_timeout: Duration::from_secs(5),
            enabled_setting_key: "AlexaEnabled".to_string(),
            enabled_default: "true".to_string(),
            friendly_name_setting_key: "AlexaFriendlyName".to_string(),
            manufacturer_name: "MythTV".to_string(),
        }
    }
}

impl BridgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Short timeouts for tests and local development
    pub fn fast_tests() -> Self {
        Self {
            monitor_timeout: Duration::from_millis(200),
            stop_timeout: Duration::from_millis(100),
            network_control_timeout: Duration::from_millis(500),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.monitor_timeout.is_zero() {
            return Err(BridgeError::InvalidSetting {
                key: "monitor_timeout".to_string(),
                value: format!("{:?}", self.monitor_timeout),
            });
        }
        if self.network_control_port == 0 {
            return Err(BridgeError::InvalidSetting {
                key: "network_control_port".to_string(),
                value: "0".to_string(),
            });
        }
        if self.manufacturer_name.is_empty() {
            return Err(BridgeError::InvalidSetting {
                key: "manufacturer_name".to_string(),
                value: String::new(),
            });
        }
        Ok(())
    }

    pub fn with_monitor_timeout(mut self, timeout: Duration) -> Self {
        self.monitor_timeout = timeout;
        self
    }

    pub fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }

    pub fn with_network_control(mut self, port: u16, timeout: Duration) -> Self {
        self.network_control_port = port;
        self.network_control_timeout = timeout;
        self
    }

    pub fn with_manufacturer_name(mut self, name: impl Into<String>) -> Self {
        self.manufacturer_name = name.into();
        self
    }
}
