// src/collector/config.rs

use crate::common::{error::ConfigError, limits::MAX_QUEUED_READINGS, types::SensorTypeMask};

/// Settings for a `Router` and the devices its registry creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterConfig {
    /// Accepted-type mask given to newly created devices.
    pub default_type_mask: SensorTypeMask,
    /// Upper bound on tracked devices. `None` tracks every sender ever seen.
    pub max_devices: Option<usize>,
    /// Per-device bound on undelivered readings.
    pub queue_capacity: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        RouterConfig {
            default_type_mask: SensorTypeMask::ALL,
            max_devices: None,
            queue_capacity: MAX_QUEUED_READINGS,
        }
    }
}

impl RouterConfig {
    pub fn with_default_type_mask(mut self, mask: SensorTypeMask) -> Self {
        self.default_type_mask = mask;
        self
    }

    pub fn with_max_devices(mut self, max_devices: usize) -> Self {
        self.max_devices = Some(max_devices);
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.default_type_mask.validate()?;
        if self.max_devices == Some(0) {
            return Err(ConfigError::InvalidDeviceLimit);
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::InvalidQueueCapacity(0));
        }
        Ok(())
    }
}
