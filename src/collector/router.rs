// src/collector/router.rs

use portable_atomic::{AtomicU64, Ordering};
use tracing::{trace, warn};

use super::config::RouterConfig;
use super::registry::{DeviceRegistry, RegistryError};
use crate::common::{
    address::SensorAddr, error::ConfigError, hal_traits::Clock, types::SensorTypeTag,
};
use crate::sensor::{lookup_type, EnqueueResult, Reading};
use crate::wire::{decode_message, DecodeError};

/// Why a received message produced no delivery at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("Payload decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("Invalid sender address: {0}")]
    InvalidAddress(ConfigError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// Outcome of one successfully decoded message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Readings queued on the device.
    pub accepted: usize,
    /// Readings whose type the device does not accept.
    pub filtered: usize,
    /// Fields whose name resolved to no sensor type.
    pub unknown: usize,
    /// Readings dropped because the device queue was full.
    pub dropped: usize,
    /// Readings drained from the device queue for its listeners.
    pub delivered: usize,
}

/// Running totals over every message the router has seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub messages: u64,
    pub decode_failures: u64,
    pub invalid_addresses: u64,
    pub registry_exhausted: u64,
    pub unknown_fields: u64,
    pub filtered: u64,
    pub dropped_queue_full: u64,
    pub delivered: u64,
}

// Relaxed counters; the dispatch path takes no router-wide lock.
#[derive(Debug, Default)]
struct StatCounters {
    messages: AtomicU64,
    decode_failures: AtomicU64,
    invalid_addresses: AtomicU64,
    registry_exhausted: AtomicU64,
    unknown_fields: AtomicU64,
    filtered: AtomicU64,
    dropped_queue_full: AtomicU64,
    delivered: AtomicU64,
}

impl StatCounters {
    fn add(counter: &AtomicU64, n: usize) {
        if n > 0 {
            counter.fetch_add(n as u64, Ordering::Relaxed);
        }
    }

    fn record_report(&self, report: &DispatchReport) {
        Self::add(&self.unknown_fields, report.unknown);
        Self::add(&self.filtered, report.filtered);
        Self::add(&self.dropped_queue_full, report.dropped);
        Self::add(&self.delivered, report.delivered);
    }

    fn record_error(&self, error: &DispatchError) {
        let counter = match error {
            DispatchError::Decode(_) => &self.decode_failures,
            DispatchError::InvalidAddress(_) => &self.invalid_addresses,
            DispatchError::Registry(RegistryError::Exhausted { .. }) => &self.registry_exhausted,
            DispatchError::Registry(RegistryError::Config(_)) => return,
        };
        Self::add(counter, 1);
    }

    fn snapshot(&self) -> DispatchStats {
        DispatchStats {
            messages: self.messages.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            invalid_addresses: self.invalid_addresses.load(Ordering::Relaxed),
            registry_exhausted: self.registry_exhausted.load(Ordering::Relaxed),
            unknown_fields: self.unknown_fields.load(Ordering::Relaxed),
            filtered: self.filtered.load(Ordering::Relaxed),
            dropped_queue_full: self.dropped_queue_full.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
        }
    }
}

/// Routes each received message to the virtual device of its sender.
///
/// A message is handled to completion before `on_message_received` returns:
/// decoded, resolved, queued and delivered as one batch.
pub struct Router<C: Clock> {
    registry: DeviceRegistry,
    clock: C,
    stats: StatCounters,
}

impl<C: Clock> core::fmt::Debug for Router<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Router")
            .field("registry", &self.registry)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl<C: Clock> Router<C> {
    pub fn new(clock: C, config: &RouterConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_registry(DeviceRegistry::with_config(config)?, clock))
    }

    /// Router over an existing registry, e.g. one with devices pre-configured
    /// through `get_or_create_with`.
    pub fn with_registry(registry: DeviceRegistry, clock: C) -> Self {
        Router { registry, clock, stats: StatCounters::default() }
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// Snapshot of the counters. Fields are read one by one, so a snapshot
    /// taken while messages are in flight may mix before and after values.
    pub fn stats(&self) -> DispatchStats {
        self.stats.snapshot()
    }

    /// Handles one message received from `sender`.
    ///
    /// Nothing is created or touched when the payload does not decode or the
    /// address is invalid. Fields with unknown names are skipped. Every
    /// accepted reading of the message reaches the listeners in one drain.
    pub fn on_message_received(
        &self,
        sender: &str,
        payload: &[u8],
    ) -> Result<DispatchReport, DispatchError> {
        let result = self.dispatch(sender, payload);
        StatCounters::add(&self.stats.messages, 1);
        match &result {
            Ok(report) => self.stats.record_report(report),
            Err(e) => {
                self.stats.record_error(e);
                warn!(sender, error = %e, "dropping message");
            }
        }
        result
    }

    fn dispatch(&self, sender: &str, payload: &[u8]) -> Result<DispatchReport, DispatchError> {
        let fields = decode_message(payload)?;
        let addr = SensorAddr::new(sender).map_err(DispatchError::InvalidAddress)?;
        let device = self.registry.get_or_create(&addr)?;

        let mut report = DispatchReport::default();
        let batch = device.begin_batch();
        for field in &fields {
            let tag = lookup_type(field.name);
            if tag == SensorTypeTag::None {
                trace!(addr = %addr, field = field.name, "unknown field name, skipping");
                report.unknown += 1;
                continue;
            }
            trace!(
                addr = %addr,
                field = field.name,
                sensor_type = %tag,
                kind = field.value.type_name(),
                value = %field.value,
                "field resolved"
            );
            match batch.enqueue(Reading::new(tag, field.name, field.value)) {
                EnqueueResult::Queued => report.accepted += 1,
                EnqueueResult::Filtered => report.filtered += 1,
                EnqueueResult::QueueFull => report.dropped += 1,
            }
        }
        report.delivered = batch.finish(self.clock.now());
        Ok(report)
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{sync::Mutex, types::SensorTypeMask};
    use crate::sensor::{RemoteSensor, RemoteSensorConfig, SensorListener, SensorValue};
    use alloc::string::{String, ToString};
    use alloc::sync::Arc;
    use alloc::vec::Vec;
    use core::sync::atomic::{AtomicU64, Ordering};
    use std::thread;

    // {"temp": 21.5, "hum": 40}
    const TEMP_HUM: &[u8] = &[
        0xA2, //
        0x64, b't', b'e', b'm', b'p', 0xFB, 0x40, 0x35, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, //
        0x63, b'h', b'u', b'm', 0x18, 0x28,
    ];
    // {"foo": 1}
    const FOO: &[u8] = &[0xA1, 0x63, b'f', b'o', b'o', 0x01];
    // {"t": 1745}
    const RAW_T: &[u8] = &[0xA1, 0x61, b't', 0x19, 0x06, 0xD1];

    #[derive(Default)]
    struct MockClock(AtomicU64);

    impl MockClock {
        fn set(&self, t: u64) {
            self.0.store(t, Ordering::SeqCst);
        }
    }

    impl Clock for MockClock {
        fn now(&self) -> u64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    #[derive(Default)]
    struct RecordingListener {
        calls: Mutex<Vec<(String, Vec<Reading>)>>,
    }

    impl RecordingListener {
        fn calls(&self) -> Vec<(String, Vec<Reading>)> {
            self.calls.lock().clone()
        }
    }

    impl SensorListener for RecordingListener {
        fn on_readings(&self, sensor: &RemoteSensor, readings: &[Reading]) {
            self.calls.lock().push((sensor.addr().to_string(), readings.to_vec()));
        }
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    fn router() -> (Router<Arc<MockClock>>, Arc<MockClock>) {
        init_tracing();
        let clock = Arc::new(MockClock::default());
        let router = Router::new(Arc::clone(&clock), &RouterConfig::default()).unwrap();
        (router, clock)
    }

    fn attach(
        router: &Router<Arc<MockClock>>,
        addr: &str,
    ) -> (Arc<RemoteSensor>, Arc<RecordingListener>) {
        let device = router.registry().get_or_create(&SensorAddr::new(addr).unwrap()).unwrap();
        let listener = Arc::new(RecordingListener::default());
        device.register_listener(listener.clone());
        (device, listener)
    }

    #[test]
    fn test_first_message_creates_device_and_delivers_batch() {
        let (router, clock) = router();
        clock.set(1_000);

        let report = router.on_message_received("node-1", TEMP_HUM).unwrap();
        assert_eq!(report, DispatchReport { accepted: 2, delivered: 2, ..Default::default() });

        // No listener yet: values are kept for `read`, but nothing was delivered
        let device = router.registry().lookup("node-1").unwrap();
        assert_eq!(device.last_read_time(), None);
        let temp = device.read(SensorTypeTag::AmbientTemperature.into());
        assert_eq!(temp[0].value, SensorValue::Float(21.5));
        let hum = device.read(SensorTypeTag::RelativeHumidity.into());
        assert_eq!(hum[0].value, SensorValue::Int(40));
    }

    #[test]
    fn test_listener_sees_both_readings_in_one_call() {
        let (router, clock) = router();
        let (device, listener) = attach(&router, "node-1");
        clock.set(1_000);

        router.on_message_received("node-1", TEMP_HUM).unwrap();

        let calls = listener.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "node-1");
        let readings = &calls[0].1;
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].sensor_type, SensorTypeTag::AmbientTemperature);
        assert_eq!(readings[0].key, "temp");
        assert_eq!(readings[0].value, SensorValue::Float(21.5));
        assert_eq!(readings[1].sensor_type, SensorTypeTag::RelativeHumidity);
        assert_eq!(readings[1].value, SensorValue::Int(40));
        assert_eq!(device.last_read_time(), Some(1_000));
    }

    #[test]
    fn test_unknown_fields_reuse_device_without_delivery() {
        let (router, clock) = router();
        let (device, listener) = attach(&router, "node-1");
        clock.set(1_000);
        router.on_message_received("node-1", TEMP_HUM).unwrap();

        clock.set(2_000);
        let report = router.on_message_received("node-1", FOO).unwrap();
        assert_eq!(report, DispatchReport { unknown: 1, ..Default::default() });

        assert!(Arc::ptr_eq(&device, &router.registry().lookup("node-1").unwrap()));
        assert_eq!(router.registry().len(), 1);
        assert_eq!(listener.calls().len(), 1);
        assert_eq!(device.pending(), 0);
        assert_eq!(device.last_read_time(), Some(1_000));
    }

    #[test]
    fn test_truncated_payload_creates_nothing() {
        let (router, _clock) = router();
        let truncated = &TEMP_HUM[..10];

        let err = router.on_message_received("node-7", truncated).unwrap_err();
        assert_eq!(err, DispatchError::Decode(DecodeError::Truncated));
        assert!(router.registry().lookup("node-7").is_none());
        assert!(router.registry().is_empty());

        let stats = router.stats();
        assert_eq!(stats.messages, 1);
        assert_eq!(stats.decode_failures, 1);
        assert_eq!(stats.delivered, 0);
    }

    #[test]
    fn test_decode_failure_leaves_known_device_untouched() {
        let (router, clock) = router();
        let (device, listener) = attach(&router, "node-1");
        clock.set(5);

        assert!(router.on_message_received("node-1", &[]).is_err());
        assert!(router.on_message_received("node-1", &TEMP_HUM[..TEMP_HUM.len() - 1]).is_err());
        assert!(listener.calls().is_empty());
        assert_eq!(device.last_read_time(), None);
    }

    #[test]
    fn test_invalid_sender_is_rejected() {
        let (router, _clock) = router();
        let err = router.on_message_received("bad addr", TEMP_HUM).unwrap_err();
        assert_eq!(err, DispatchError::InvalidAddress(ConfigError::InvalidAddressChar(' ')));
        assert!(router.registry().is_empty());
        assert_eq!(router.stats().invalid_addresses, 1);
    }

    #[test]
    fn test_type_mask_filters_readings() {
        let (router, clock) = router();
        let addr = SensorAddr::new("node-1").unwrap();
        let cfg = RemoteSensorConfig::new(addr.clone(), SensorTypeTag::RelativeHumidity.into());
        let device = router.registry().get_or_create_with(&addr, cfg).unwrap();
        let listener = Arc::new(RecordingListener::default());
        device.register_listener(listener.clone());
        clock.set(7);

        let report = router.on_message_received("node-1", TEMP_HUM).unwrap();
        assert_eq!(report.accepted, 1);
        assert_eq!(report.filtered, 1);
        assert_eq!(report.delivered, 1);

        let calls = listener.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].1.iter().all(|r| r.sensor_type == SensorTypeTag::RelativeHumidity));

        // Nothing accepted: no delivery, no timestamp change
        clock.set(8);
        let report = router.on_message_received("node-1", RAW_T).unwrap();
        assert_eq!(report, DispatchReport { filtered: 1, ..Default::default() });
        assert_eq!(listener.calls().len(), 1);
        assert_eq!(device.last_read_time(), Some(7));
    }

    #[test]
    fn test_each_accepted_reading_delivered_once_per_message() {
        let (router, clock) = router();
        let (_device, listener) = attach(&router, "node-1");
        for t in 1..=3 {
            clock.set(t);
            router.on_message_received("node-1", TEMP_HUM).unwrap();
        }
        let calls = listener.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls.iter().all(|(_, readings)| readings.len() == 2));
        assert_eq!(router.stats().delivered, 6);
    }

    #[test]
    fn test_registry_exhaustion_drops_message() {
        init_tracing();
        let clock = Arc::new(MockClock::default());
        let router = Router::new(clock, &RouterConfig::default().with_max_devices(1)).unwrap();
        router.on_message_received("node-1", TEMP_HUM).unwrap();

        let err = router.on_message_received("node-2", TEMP_HUM).unwrap_err();
        assert_eq!(err, DispatchError::Registry(RegistryError::Exhausted { limit: 1 }));
        assert!(router.registry().lookup("node-2").is_none());
        assert_eq!(router.stats().registry_exhausted, 1);
    }

    #[test]
    fn test_queue_capacity_limits_one_message() {
        init_tracing();
        let clock = Arc::new(MockClock::default());
        let config = RouterConfig::default().with_queue_capacity(1);
        let router = Router::new(clock, &config).unwrap();

        let report = router.on_message_received("node-1", TEMP_HUM).unwrap();
        assert_eq!(report.accepted, 1);
        assert_eq!(report.dropped, 1);
        assert_eq!(report.delivered, 1);
        assert_eq!(router.stats().dropped_queue_full, 1);
    }

    #[test]
    fn test_raw_temperature_alias() {
        let (router, _clock) = router();
        let (_device, listener) = attach(&router, "b3b4b5b6f1");
        router.on_message_received("b3b4b5b6f1", RAW_T).unwrap();
        let calls = listener.calls();
        assert_eq!(calls[0].1[0].sensor_type, SensorTypeTag::AmbientTemperatureRaw);
        assert_eq!(calls[0].1[0].value, SensorValue::Int(1745));
    }

    #[test]
    fn test_concurrent_senders_stay_separate() {
        let (router, clock) = router();
        let router = Arc::new(router);
        let (dev1, l1) = attach(&router, "node-1");
        let (dev2, l2) = attach(&router, "node-2");
        clock.set(100);

        let handles: Vec<_> = ["node-1", "node-2"]
            .into_iter()
            .map(|sender| {
                let router = Arc::clone(&router);
                thread::spawn(move || {
                    for _ in 0..50 {
                        router.on_message_received(sender, TEMP_HUM).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert!(!Arc::ptr_eq(&dev1, &dev2));
        assert_eq!(router.registry().len(), 2);
        for (name, listener) in [("node-1", &l1), ("node-2", &l2)] {
            let calls = listener.calls();
            assert_eq!(calls.len(), 50);
            assert!(calls.iter().all(|(addr, readings)| addr == name && readings.len() == 2));
        }
        assert_eq!(dev1.last_read_time(), Some(100));
        assert_eq!(dev2.last_read_time(), Some(100));
        let stats = router.stats();
        assert_eq!(stats.messages, 100);
        assert_eq!(stats.delivered, 200);
        assert_eq!(stats.decode_failures, 0);
    }

    #[test]
    fn test_concurrent_first_messages_create_one_device() {
        let (router, _clock) = router();
        let router = Arc::new(router);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let router = Arc::clone(&router);
                thread::spawn(move || router.on_message_received("node-9", TEMP_HUM).unwrap())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap().delivered, 2);
        }
        assert_eq!(router.registry().addresses(), [SensorAddr::new("node-9").unwrap()]);
        assert_eq!(router.stats().delivered, 16);
        assert_eq!(router.registry().lookup("node-9").unwrap().type_mask(), SensorTypeMask::ALL);
    }
}
