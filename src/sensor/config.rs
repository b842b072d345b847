// src/sensor/config.rs

use crate::common::{address::SensorAddr, error::ConfigError, types::SensorTypeMask};

/// Configuration of one remote sensor device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSensorConfig {
    /// Sensor types this device passes on to listeners.
    pub type_mask: SensorTypeMask,
    /// Address of the sensor node this device stands in for.
    pub addr: SensorAddr,
}

impl RemoteSensorConfig {
    pub fn new(addr: SensorAddr, type_mask: SensorTypeMask) -> Self {
        RemoteSensorConfig { type_mask, addr }
    }

    /// "Accept all known types" for `addr`.
    pub fn default_for(addr: SensorAddr) -> Self {
        Self::new(addr, SensorTypeMask::ALL)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.type_mask.validate()
    }
}

/// Fills `cfg` with the default "accept all known types" mask, keeping its address.
///
/// # Returns
///
/// `Ok(())`. The "accept all" mask is always valid.
pub fn remote_sensor_default_cfg(cfg: &mut RemoteSensorConfig) -> Result<(), ConfigError> {
    cfg.type_mask = SensorTypeMask::ALL;
    Ok(())
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::SensorTypeTag;

    fn addr(s: &str) -> SensorAddr {
        SensorAddr::new(s).unwrap()
    }

    #[test]
    fn test_default_config_accepts_all() {
        let cfg = RemoteSensorConfig::default_for(addr("node-1"));
        assert_eq!(cfg.type_mask, SensorTypeMask::ALL);
        assert_eq!(cfg.addr.as_str(), "node-1");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_default_cfg_resets_mask() {
        let mut cfg = RemoteSensorConfig::new(addr("n"), SensorTypeTag::Light.into());
        assert!(remote_sensor_default_cfg(&mut cfg).is_ok());
        assert_eq!(cfg.type_mask, SensorTypeMask::ALL);
        assert_eq!(cfg.addr.as_str(), "n");
    }

    #[test]
    fn test_invalid_masks() {
        let cfg = RemoteSensorConfig::new(addr("n"), SensorTypeMask::EMPTY);
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyTypeMask));
        let cfg = RemoteSensorConfig::new(addr("n"), SensorTypeMask::from_bits(1 << 31));
        assert_eq!(cfg.validate(), Err(ConfigError::UnknownTypeBits(1 << 31)));
    }
}
