// src/sensor/device.rs

use alloc::collections::{BTreeMap, VecDeque};
use alloc::sync::Arc;
use alloc::vec::Vec;

use tracing::{debug, trace, warn};

use super::config::RemoteSensorConfig;
use super::listener::SensorListener;
use super::reading::Reading;
use crate::common::{
    address::SensorAddr,
    error::ConfigError,
    hal_traits::Timestamp,
    sync::{Mutex, MutexGuard},
    types::{SensorTypeMask, SensorTypeTag},
};

/// What happened to a reading handed to `RemoteSensor::enqueue`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EnqueueResult {
    Queued,
    /// Type not in the device's accepted mask; dropped silently.
    Filtered,
    /// Queue already held `queue_capacity` readings; dropped.
    QueueFull,
}

#[derive(Debug, Default)]
struct DeviceState {
    queue: VecDeque<Reading>,
    last_read_time: Option<Timestamp>,
    /// Most recent delivered reading per type, answers `read`.
    latest: BTreeMap<SensorTypeTag, Reading>,
}

/// Virtual sensor device standing in for one remote sensor node.
///
/// Created by `DeviceRegistry` on the first packet from an address and shared
/// as `Arc<RemoteSensor>`. Listeners registered here see remote readings
/// exactly like readings from a local sensor.
pub struct RemoteSensor {
    addr: SensorAddr,
    cfg: Mutex<RemoteSensorConfig>,
    state: Mutex<DeviceState>,
    listeners: Mutex<Vec<Arc<dyn SensorListener>>>,
    /// Held for a whole enqueue/drain batch so deliveries never interleave.
    delivery: Mutex<()>,
    queue_capacity: usize,
}

impl core::fmt::Debug for RemoteSensor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RemoteSensor")
            .field("addr", &self.addr)
            .field("type_mask", &self.cfg.lock().type_mask)
            .field("listeners", &self.listeners.lock().len())
            .finish_non_exhaustive()
    }
}

impl RemoteSensor {
    /// `cfg` must already be validated; the registry does this.
    pub(crate) fn new(cfg: RemoteSensorConfig, queue_capacity: usize) -> Self {
        RemoteSensor {
            addr: cfg.addr.clone(),
            cfg: Mutex::new(cfg),
            state: Mutex::new(DeviceState::default()),
            listeners: Mutex::new(Vec::new()),
            delivery: Mutex::new(()),
            queue_capacity,
        }
    }

    // --- Identity & Configuration ---

    #[inline]
    pub fn addr(&self) -> &SensorAddr {
        &self.addr
    }

    pub fn config(&self) -> RemoteSensorConfig {
        self.cfg.lock().clone()
    }

    pub fn type_mask(&self) -> SensorTypeMask {
        self.cfg.lock().type_mask
    }

    /// Replaces the configuration wholesale. The address cannot change.
    pub(crate) fn set_config(&self, cfg: RemoteSensorConfig) -> Result<(), ConfigError> {
        cfg.validate()?;
        if cfg.addr != self.addr {
            return Err(ConfigError::AddressMismatch);
        }
        *self.cfg.lock() = cfg;
        Ok(())
    }

    // --- Listeners ---

    /// Adds a listener. Listeners are called in registration order.
    pub fn register_listener(&self, listener: Arc<dyn SensorListener>) {
        self.listeners.lock().push(listener);
    }

    pub fn unregister_listeners(&self) {
        self.listeners.lock().clear();
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    // --- Reading State ---

    /// Time of the most recent delivery, `None` before the first one.
    pub fn last_read_time(&self) -> Option<Timestamp> {
        self.state.lock().last_read_time
    }

    /// Readings queued but not yet delivered.
    pub fn pending(&self) -> usize {
        self.state.lock().queue.len()
    }

    /// Most recently delivered reading of each type in `types`, in type order.
    ///
    /// This answers a poll of the virtual device the way a local sensor would
    /// answer a read, without touching the radio.
    pub fn read(&self, types: SensorTypeMask) -> Vec<Reading> {
        let state = self.state.lock();
        types.iter().filter_map(|t| state.latest.get(&t).cloned()).collect()
    }

    // --- Delivery ---

    /// Queues `reading` if its type is accepted by this device.
    pub fn enqueue(&self, reading: Reading) -> EnqueueResult {
        let mask = self.type_mask();
        if !mask.contains(reading.sensor_type) {
            trace!(
                addr = %self.addr,
                sensor_type = %reading.sensor_type,
                "reading filtered by type mask"
            );
            return EnqueueResult::Filtered;
        }
        let mut state = self.state.lock();
        if state.queue.len() >= self.queue_capacity {
            warn!(
                addr = %self.addr,
                capacity = self.queue_capacity,
                "reading queue full, dropping reading"
            );
            return EnqueueResult::QueueFull;
        }
        state.queue.push_back(reading);
        EnqueueResult::Queued
    }

    /// Delivers every queued reading to the listeners as one batch.
    ///
    /// Readings leave the queue in arrival order. Each listener is called once
    /// with the readings its own mask accepts, and skipped if that leaves
    /// nothing. The last-read time becomes `now` (never moving backwards) only
    /// when at least one listener receives a reading; it is already set when
    /// the listeners run.
    ///
    /// # Returns
    ///
    /// The number of readings drained.
    pub fn drain_and_notify(&self, now: Timestamp) -> usize {
        let _delivery = self.delivery.lock();
        self.drain_locked(now)
    }

    /// Locks delivery for one packet: readings queued through the returned
    /// batch are delivered together by `DeliveryBatch::finish`.
    pub(crate) fn begin_batch(&self) -> DeliveryBatch<'_> {
        DeliveryBatch { sensor: self, _delivery: self.delivery.lock() }
    }

    fn drain_locked(&self, now: Timestamp) -> usize {
        // Snapshot so listeners may register further listeners or query this device.
        let listeners: Vec<Arc<dyn SensorListener>> = self.listeners.lock().clone();

        let (drained, deliveries) = {
            let mut state = self.state.lock();
            if state.queue.is_empty() {
                return 0;
            }
            let batch: Vec<Reading> = state.queue.drain(..).collect();
            for reading in &batch {
                state.latest.insert(reading.sensor_type, reading.clone());
            }

            let deliveries: Vec<(&Arc<dyn SensorListener>, Vec<Reading>)> = listeners
                .iter()
                .filter_map(|listener| {
                    let wanted = listener.sensor_types();
                    let accepted: Vec<Reading> =
                        batch.iter().filter(|r| wanted.contains(r.sensor_type)).cloned().collect();
                    (!accepted.is_empty()).then_some((listener, accepted))
                })
                .collect();

            if !deliveries.is_empty() {
                let last = state.last_read_time.map_or(now, |prev| prev.max(now));
                state.last_read_time = Some(last);
            }
            (batch.len(), deliveries)
        };

        for (listener, readings) in &deliveries {
            listener.on_readings(self, readings);
        }

        debug!(
            addr = %self.addr,
            readings = drained,
            listeners = deliveries.len(),
            "delivered readings"
        );
        drained
    }
}

/// Delivery lock for one packet. See `RemoteSensor::begin_batch`.
pub(crate) struct DeliveryBatch<'a> {
    sensor: &'a RemoteSensor,
    _delivery: MutexGuard<'a, ()>,
}

impl DeliveryBatch<'_> {
    pub(crate) fn enqueue(&self, reading: Reading) -> EnqueueResult {
        self.sensor.enqueue(reading)
    }

    pub(crate) fn finish(self, now: Timestamp) -> usize {
        self.sensor.drain_locked(now)
    }
}
