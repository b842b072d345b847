// src/wire/mod.rs

// Sensor nodes send one CBOR map per radio packet, e.g. `{"t": 1745}` or
// `{"temp": 21.5, "hum": 40}`. This module turns those bytes into borrowed
// field/value pairs and knows nothing about sensor types.

mod error;
mod value;
pub mod decode;

pub use decode::decode_message;
pub use error::DecodeError;
pub use value::{Field, FieldMap, FieldValue};
