// src/common/types.rs

use super::error::ConfigError;
use core::fmt;
use core::ops::BitOr;

// --- Sensor Type Tags ---

/// Kind of physical quantity a reading represents.
///
/// Each known tag owns one bit, with the same values as the Mynewt sensor
/// framework's `sensor_type_t`, so masks can be passed through unchanged.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(u32)]
pub enum SensorTypeTag {
    /// Sentinel for field names that match no known sensor type.
    None = 0,
    Accelerometer = 1 << 0,
    MagneticField = 1 << 1,
    Gyroscope = 1 << 2,
    Light = 1 << 3,
    Temperature = 1 << 4,
    AmbientTemperature = 1 << 5,
    Pressure = 1 << 6,
    Proximity = 1 << 7,
    RelativeHumidity = 1 << 8,
    RotationVector = 1 << 9,
    Altitude = 1 << 10,
    Weight = 1 << 11,
    LinearAccel = 1 << 12,
    Gravity = 1 << 13,
    Euler = 1 << 14,
    Color = 1 << 15,
    Voltage = 1 << 16,
    Current = 1 << 17,
    /// Raw ADC temperature (integer 0..4095), user-defined type 1.
    AmbientTemperatureRaw = 1 << 26,
    /// Latitude/longitude fix, user-defined type 2.
    Geolocation = 1 << 27,
}

impl SensorTypeTag {
    /// Every known tag, in bit order. Excludes `None`.
    pub const KNOWN: [SensorTypeTag; 20] = [
        SensorTypeTag::Accelerometer,
        SensorTypeTag::MagneticField,
        SensorTypeTag::Gyroscope,
        SensorTypeTag::Light,
        SensorTypeTag::Temperature,
        SensorTypeTag::AmbientTemperature,
        SensorTypeTag::Pressure,
        SensorTypeTag::Proximity,
        SensorTypeTag::RelativeHumidity,
        SensorTypeTag::RotationVector,
        SensorTypeTag::Altitude,
        SensorTypeTag::Weight,
        SensorTypeTag::LinearAccel,
        SensorTypeTag::Gravity,
        SensorTypeTag::Euler,
        SensorTypeTag::Color,
        SensorTypeTag::Voltage,
        SensorTypeTag::Current,
        SensorTypeTag::AmbientTemperatureRaw,
        SensorTypeTag::Geolocation,
    ];

    #[inline]
    pub const fn bits(self) -> u32 {
        self as u32
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        matches!(self, SensorTypeTag::None)
    }

    /// Tries to convert a single-bit `sensor_type_t` value into a tag.
    pub fn from_bits(bits: u32) -> Option<Self> {
        if bits == 0 {
            return Some(SensorTypeTag::None);
        }
        Self::KNOWN.iter().copied().find(|t| t.bits() == bits)
    }

    /// Short human-readable name, used in logs.
    pub const fn name(self) -> &'static str {
        match self {
            SensorTypeTag::None => "none",
            SensorTypeTag::Accelerometer => "accelerometer",
            SensorTypeTag::MagneticField => "magnetic_field",
            SensorTypeTag::Gyroscope => "gyroscope",
            SensorTypeTag::Light => "light",
            SensorTypeTag::Temperature => "temperature",
            SensorTypeTag::AmbientTemperature => "ambient_temperature",
            SensorTypeTag::Pressure => "pressure",
            SensorTypeTag::Proximity => "proximity",
            SensorTypeTag::RelativeHumidity => "relative_humidity",
            SensorTypeTag::RotationVector => "rotation_vector",
            SensorTypeTag::Altitude => "altitude",
            SensorTypeTag::Weight => "weight",
            SensorTypeTag::LinearAccel => "linear_accel",
            SensorTypeTag::Gravity => "gravity",
            SensorTypeTag::Euler => "euler",
            SensorTypeTag::Color => "color",
            SensorTypeTag::Voltage => "voltage",
            SensorTypeTag::Current => "current",
            SensorTypeTag::AmbientTemperatureRaw => "ambient_temperature_raw",
            SensorTypeTag::Geolocation => "geolocation",
        }
    }
}

impl fmt::Display for SensorTypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// --- Sensor Type Masks ---

/// Set of sensor types, one bit per `SensorTypeTag`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SensorTypeMask(u32);

impl SensorTypeMask {
    pub const EMPTY: SensorTypeMask = SensorTypeMask(0);

    /// Union of every known tag: "accept all known types".
    pub const ALL: SensorTypeMask = {
        let mut bits = 0;
        let mut i = 0;
        while i < SensorTypeTag::KNOWN.len() {
            bits |= SensorTypeTag::KNOWN[i].bits();
            i += 1;
        }
        SensorTypeMask(bits)
    };

    /// Wraps raw bits without validation. See `validate`.
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        SensorTypeMask(bits)
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    pub fn from_tags(tags: &[SensorTypeTag]) -> Self {
        tags.iter().fold(Self::EMPTY, |mask, tag| mask.with(*tag))
    }

    #[inline]
    pub const fn with(self, tag: SensorTypeTag) -> Self {
        SensorTypeMask(self.0 | tag.bits())
    }

    /// `true` if `tag` is a known tag selected by this mask. `None` is never contained.
    #[inline]
    pub const fn contains(self, tag: SensorTypeTag) -> bool {
        let bits = tag.bits();
        bits != 0 && self.0 & bits == bits
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Checks that the mask selects at least one type and nothing unknown.
    pub fn validate(self) -> Result<(), ConfigError> {
        if self.is_empty() {
            return Err(ConfigError::EmptyTypeMask);
        }
        let unknown = self.0 & !Self::ALL.0;
        if unknown != 0 {
            return Err(ConfigError::UnknownTypeBits(unknown));
        }
        Ok(())
    }

    /// Iterates the known tags selected by this mask, in bit order.
    pub fn iter(self) -> impl Iterator<Item = SensorTypeTag> {
        SensorTypeTag::KNOWN.into_iter().filter(move |t| self.contains(*t))
    }
}

impl Default for SensorTypeMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl From<SensorTypeTag> for SensorTypeMask {
    fn from(tag: SensorTypeTag) -> Self {
        SensorTypeMask(tag.bits())
    }
}

impl BitOr for SensorTypeMask {
    type Output = SensorTypeMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        SensorTypeMask(self.0 | rhs.0)
    }
}

impl BitOr<SensorTypeTag> for SensorTypeMask {
    type Output = SensorTypeMask;

    fn bitor(self, rhs: SensorTypeTag) -> Self::Output {
        self.with(rhs)
    }
}
