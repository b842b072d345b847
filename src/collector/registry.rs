// src/collector/registry.rs

use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::vec::Vec;

use tracing::{info, warn};

use super::config::RouterConfig;
use crate::common::{address::SensorAddr, error::ConfigError, sync::Mutex, types::SensorTypeMask};
use crate::sensor::{RemoteSensor, RemoteSensorConfig};

/// Failure to produce a device for an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The registry already tracks `limit` devices.
    #[error("Device registry full ({limit} devices)")]
    Exhausted { limit: usize },

    #[error("Invalid device configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Maps sender addresses to their virtual sensor devices.
///
/// The only place devices are created. Creation happens under the map lock,
/// so concurrent first packets from one address always end up with the same
/// device. Devices are never removed.
pub struct DeviceRegistry {
    devices: Mutex<BTreeMap<SensorAddr, Arc<RemoteSensor>>>,
    default_type_mask: SensorTypeMask,
    max_devices: Option<usize>,
    queue_capacity: usize,
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::from_valid_config(&RouterConfig::default())
    }
}

impl core::fmt::Debug for DeviceRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DeviceRegistry")
            .field("devices", &self.len())
            .field("max_devices", &self.max_devices)
            .finish()
    }
}

impl DeviceRegistry {
    /// Unbounded registry whose devices accept every known type.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &RouterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: &RouterConfig) -> Self {
        DeviceRegistry {
            devices: Mutex::new(BTreeMap::new()),
            default_type_mask: config.default_type_mask,
            max_devices: config.max_devices,
            queue_capacity: config.queue_capacity,
        }
    }

    /// Returns the device for `addr`, creating it with the default config on first use.
    pub fn get_or_create(&self, addr: &SensorAddr) -> Result<Arc<RemoteSensor>, RegistryError> {
        self.get_or_create_inner(addr, || {
            RemoteSensorConfig::new(addr.clone(), self.default_type_mask)
        })
    }

    /// Like `get_or_create`, but a new device starts with `cfg`.
    ///
    /// An existing device is returned unchanged; `cfg` is ignored for it.
    pub fn get_or_create_with(
        &self,
        addr: &SensorAddr,
        cfg: RemoteSensorConfig,
    ) -> Result<Arc<RemoteSensor>, RegistryError> {
        cfg.validate()?;
        if cfg.addr != *addr {
            return Err(ConfigError::AddressMismatch.into());
        }
        self.get_or_create_inner(addr, || cfg)
    }

    fn get_or_create_inner<F>(
        &self,
        addr: &SensorAddr,
        make_cfg: F,
    ) -> Result<Arc<RemoteSensor>, RegistryError>
    where
        F: FnOnce() -> RemoteSensorConfig,
    {
        let mut devices = self.devices.lock();
        if let Some(device) = devices.get(addr) {
            return Ok(Arc::clone(device));
        }

        if let Some(limit) = self.max_devices {
            if devices.len() >= limit {
                warn!(addr = %addr, limit, "device registry full, not creating device");
                return Err(RegistryError::Exhausted { limit });
            }
        }

        let device = Arc::new(RemoteSensor::new(make_cfg(), self.queue_capacity));
        devices.insert(addr.clone(), Arc::clone(&device));
        info!(addr = %addr, devices = devices.len(), "created remote sensor");
        Ok(device)
    }

    /// Validates `cfg` and replaces `device`'s configuration with it.
    pub fn configure(
        &self,
        device: &RemoteSensor,
        cfg: RemoteSensorConfig,
    ) -> Result<(), ConfigError> {
        device.set_config(cfg)?;
        info!(
            addr = %device.addr(),
            type_mask = device.type_mask().bits(),
            "reconfigured remote sensor"
        );
        Ok(())
    }

    /// Looks up a device without creating one.
    pub fn lookup(&self, addr: &str) -> Option<Arc<RemoteSensor>> {
        self.devices.lock().get(addr).cloned()
    }

    pub fn len(&self) -> usize {
        self.devices.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.lock().is_empty()
    }

    pub fn max_devices(&self) -> Option<usize> {
        self.max_devices
    }

    /// Sorted snapshot of every tracked address.
    pub fn addresses(&self) -> Vec<SensorAddr> {
        self.devices.lock().keys().cloned().collect()
    }
}
