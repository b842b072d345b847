// src/lib.rs

#![no_std] // Specify no_std at the crate root

// The registry owns a map of shared device handles, so alloc is always linked.
extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod collector;
pub mod common;
pub mod sensor;
pub mod wire;

// Re-export key types for convenience
pub use collector::{
    Collector, DeviceRegistry, DispatchError, DispatchReport, Router, RouterConfig,
};
pub use common::{Error, SensorAddr, SensorTypeMask, SensorTypeTag};
pub use sensor::{
    lookup_type, remote_sensor_default_cfg, RemoteSensor, RemoteSensorConfig, SensorListener,
};
pub use wire::{decode_message, DecodeError, FieldValue};
