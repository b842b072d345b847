// src/sensor/resolver.rs

use crate::common::types::SensorTypeTag;

/// Field names sent by sensor nodes, sorted by byte order for binary search.
/// Several abbreviations may share a tag.
static SENSOR_TYPE_NAMES: [(&str, SensorTypeTag); 23] = [
    ("acc", SensorTypeTag::Accelerometer),
    ("alt", SensorTypeTag::Altitude),
    ("col", SensorTypeTag::Color),
    ("cur", SensorTypeTag::Current),
    ("eul", SensorTypeTag::Euler),
    ("geo", SensorTypeTag::Geolocation),
    ("grav", SensorTypeTag::Gravity),
    ("gyr", SensorTypeTag::Gyroscope),
    ("hum", SensorTypeTag::RelativeHumidity),
    ("humidity", SensorTypeTag::RelativeHumidity),
    ("lacc", SensorTypeTag::LinearAccel),
    ("light", SensorTypeTag::Light),
    ("lux", SensorTypeTag::Light),
    ("mag", SensorTypeTag::MagneticField),
    ("pressure", SensorTypeTag::Pressure),
    ("prox", SensorTypeTag::Proximity),
    ("prs", SensorTypeTag::Pressure),
    ("rot", SensorTypeTag::RotationVector),
    ("t", SensorTypeTag::AmbientTemperatureRaw),
    ("temp", SensorTypeTag::AmbientTemperature),
    ("tmp", SensorTypeTag::AmbientTemperature),
    ("volt", SensorTypeTag::Voltage),
    ("wt", SensorTypeTag::Weight),
];

/// Returns the sensor type for a message field name, or `SensorTypeTag::None`
/// if the name is not recognised. Matching is exact and case-sensitive.
pub fn lookup_type(name: &str) -> SensorTypeTag {
    SENSOR_TYPE_NAMES
        .binary_search_by(|(known, _)| (*known).cmp(name))
        .map(|i| SENSOR_TYPE_NAMES[i].1)
        .unwrap_or(SensorTypeTag::None)
}

/// Every recognised field name with its tag, in table order.
pub fn known_names() -> impl Iterator<Item = (&'static str, SensorTypeTag)> {
    SENSOR_TYPE_NAMES.iter().copied()
}
