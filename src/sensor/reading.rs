// src/sensor/reading.rs

use alloc::{string::String, vec::Vec};

use crate::common::types::SensorTypeTag;
use crate::wire::FieldValue;

/// Owned copy of a decoded value, kept on a device after the packet buffer is reused.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorValue {
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl SensorValue {
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            SensorValue::Int(i) => Some(i as f64),
            SensorValue::Float(f) => Some(f),
            _ => None,
        }
    }
}

impl From<FieldValue<'_>> for SensorValue {
    fn from(value: FieldValue<'_>) -> Self {
        match value {
            FieldValue::Int(i) => SensorValue::Int(i),
            FieldValue::Float(f) => SensorValue::Float(f),
            FieldValue::Text(s) => SensorValue::Text(String::from(s)),
            FieldValue::Bytes(b) => SensorValue::Bytes(b.to_vec()),
        }
    }
}

/// One typed value received from a sensor node.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub sensor_type: SensorTypeTag,
    /// Field name as sent by the node (`"t"`, `"hum"`, ...).
    pub key: String,
    pub value: SensorValue,
}

impl Reading {
    pub fn new(sensor_type: SensorTypeTag, key: &str, value: FieldValue<'_>) -> Self {
        Reading { sensor_type, key: String::from(key), value: value.into() }
    }
}
