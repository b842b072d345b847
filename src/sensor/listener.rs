// src/sensor/listener.rs

use super::device::RemoteSensor;
use super::reading::Reading;
use crate::common::types::SensorTypeMask;

/// Receives readings delivered by a `RemoteSensor`, the same way a listener on
/// a locally attached sensor receives poll results.
///
/// `on_readings` is called once per received packet with every reading of that
/// packet that passes both the device's and the listener's type masks.
///
/// # Constraints on implementors
///
/// Listeners run synchronously on the receive path. They must not block, and
/// must hand longer work (network sends, storage) to another task. A listener
/// must not trigger another delivery on the same device from inside
/// `on_readings`; deliveries to one device are serialized and that call would
/// never return.
pub trait SensorListener: Send + Sync {
    /// Sensor types this listener wants. Defaults to every known type.
    fn sensor_types(&self) -> SensorTypeMask {
        SensorTypeMask::ALL
    }

    fn on_readings(&self, sensor: &RemoteSensor, readings: &[Reading]);
}

impl<F> SensorListener for F
where
    F: Fn(&RemoteSensor, &[Reading]) + Send + Sync,
{
    fn on_readings(&self, sensor: &RemoteSensor, readings: &[Reading]) {
        self(sensor, readings)
    }
}
