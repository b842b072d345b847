// src/sensor/mod.rs

// Everything that makes a remote node look like a local sensor: the type
// vocabulary, per-device configuration, the virtual device itself and the
// listener contract.

pub mod config;
pub mod device;
pub mod listener;
pub mod reading;
pub mod resolver;

// --- Public Re-exports ---

pub use config::{remote_sensor_default_cfg, RemoteSensorConfig};
pub use device::{EnqueueResult, RemoteSensor};
pub use listener::SensorListener;
pub use reading::{Reading, SensorValue};
pub use resolver::{known_names, lookup_type};
