// src/wire/decode.rs

use super::error::DecodeError;
use super::value::{Field, FieldMap, FieldValue};

use crate::common::limits::MAX_PAYLOAD_LEN;

use core::str;
use half::f16;

// --- CBOR Framing ---

/// CBOR major types (top three bits of the initial byte).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
enum MajorType {
    UnsignedInt = 0,
    NegativeInt = 1,
    ByteString = 2,
    TextString = 3,
    Array = 4,
    Map = 5,
    Tag = 6,
    Simple = 7,
}

impl MajorType {
    fn from_initial_byte(byte: u8) -> Self {
        match byte >> 5 {
            0 => MajorType::UnsignedInt,
            1 => MajorType::NegativeInt,
            2 => MajorType::ByteString,
            3 => MajorType::TextString,
            4 => MajorType::Array,
            5 => MajorType::Map,
            6 => MajorType::Tag,
            _ => MajorType::Simple,
        }
    }
}

const INDEFINITE: u8 = 31;
const BREAK: u8 = 0xFF;
const HALF_FLOAT: u8 = 25;
const SINGLE_FLOAT: u8 = 26;
const DOUBLE_FLOAT: u8 = 27;

// --- Internal Helpers ---

/// Bounds-checked reader over the payload. Every byte access goes through `take`.
struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Cursor { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self.pos.checked_add(len).ok_or(DecodeError::Truncated)?;
        let bytes = self.buf.get(self.pos..end).ok_or(DecodeError::Truncated)?;
        self.pos = end;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    fn peek_u8(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    /// Reads the argument that follows an initial byte (additional info 0..=27).
    fn read_argument(&mut self, initial: u8) -> Result<u64, DecodeError> {
        match initial & 0x1F {
            info @ 0..=23 => Ok(u64::from(info)),
            24 => Ok(u64::from(self.read_u8()?)),
            25 => Ok(u64::from(u16::from_be_bytes(self.take_array()?))),
            26 => Ok(u64::from(u32::from_be_bytes(self.take_array()?))),
            27 => Ok(u64::from_be_bytes(self.take_array()?)),
            // 28..=30 are reserved, 31 (indefinite) is only accepted for the top-level map
            _ => Err(DecodeError::UnsupportedType(initial)),
        }
    }

    /// Reads a length argument and returns the bytes it covers.
    fn read_definite_bytes(&mut self, initial: u8) -> Result<&'a [u8], DecodeError> {
        let len = self.read_argument(initial)?;
        let len = usize::try_from(len).map_err(|_| DecodeError::Truncated)?;
        self.take(len)
    }

    fn read_key(&mut self) -> Result<&'a str, DecodeError> {
        let initial = self.read_u8()?;
        if MajorType::from_initial_byte(initial) != MajorType::TextString
            || initial & 0x1F == INDEFINITE
        {
            return Err(DecodeError::NonTextKey(initial));
        }
        Ok(str::from_utf8(self.read_definite_bytes(initial)?)?)
    }

    fn read_value(&mut self) -> Result<FieldValue<'a>, DecodeError> {
        let initial = self.read_u8()?;
        match MajorType::from_initial_byte(initial) {
            MajorType::UnsignedInt => {
                let n = self.read_argument(initial)?;
                let n = i64::try_from(n).map_err(|_| DecodeError::IntegerOverflow)?;
                Ok(FieldValue::Int(n))
            }
            MajorType::NegativeInt => {
                // Encoded as -1 - n
                let n = self.read_argument(initial)?;
                let n = i64::try_from(n).map_err(|_| DecodeError::IntegerOverflow)?;
                Ok(FieldValue::Int(-1 - n))
            }
            MajorType::ByteString => Ok(FieldValue::Bytes(self.read_definite_bytes(initial)?)),
            MajorType::TextString => {
                let bytes = self.read_definite_bytes(initial)?;
                Ok(FieldValue::Text(str::from_utf8(bytes)?))
            }
            MajorType::Simple => match initial & 0x1F {
                HALF_FLOAT => {
                    let half = f16::from_bits(u16::from_be_bytes(self.take_array()?));
                    Ok(FieldValue::Float(half.to_f64()))
                }
                SINGLE_FLOAT => {
                    Ok(FieldValue::Float(f64::from(f32::from_be_bytes(self.take_array()?))))
                }
                DOUBLE_FLOAT => Ok(FieldValue::Float(f64::from_be_bytes(self.take_array()?))),
                _ => Err(DecodeError::UnsupportedType(initial)),
            },
            MajorType::Array | MajorType::Map | MajorType::Tag => {
                Err(DecodeError::UnsupportedType(initial))
            }
        }
    }
}

fn read_pair<'a>(cursor: &mut Cursor<'a>, fields: &mut FieldMap<'a>) -> Result<(), DecodeError> {
    let name = cursor.read_key()?;
    let value = cursor.read_value()?;
    fields.try_push(Field { name, value }).map_err(|_| DecodeError::TooManyFields)
}

// --- Public Decoding Functions ---

/// Decodes a sensor message: one CBOR map of text keys to scalar values.
///
/// Accepts definite (`0xA0..`) and indefinite (`0xBF ... 0xFF`) length maps. The
/// whole buffer must be consumed by the map. Nothing outside `payload` is ever
/// read, whatever the length prefixes claim.
///
/// # Returns
///
/// * `Ok(FieldMap)` with every pair, in encoded order.
/// * `Err(DecodeError)` if the payload is empty, oversized, truncated or uses
///   encodings sensor nodes do not send.
pub fn decode_message(payload: &[u8]) -> Result<FieldMap<'_>, DecodeError> {
    if payload.is_empty() {
        return Err(DecodeError::Empty);
    }
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(DecodeError::PayloadTooLarge(payload.len()));
    }

    let mut cursor = Cursor::new(payload);
    let initial = cursor.read_u8()?;
    if MajorType::from_initial_byte(initial) != MajorType::Map {
        return Err(DecodeError::NotAMap(initial));
    }

    let mut fields = FieldMap::new();

    if initial & 0x1F == INDEFINITE {
        loop {
            match cursor.peek_u8() {
                None => return Err(DecodeError::Truncated),
                Some(BREAK) => {
                    cursor.read_u8()?;
                    break;
                }
                Some(_) => read_pair(&mut cursor, &mut fields)?,
            }
        }
    } else {
        let count = cursor.read_argument(initial)?;
        // A pair needs at least two bytes; reject impossible counts before looping.
        if count > (cursor.remaining() / 2) as u64 {
            return Err(DecodeError::Truncated);
        }
        for _ in 0..count {
            read_pair(&mut cursor, &mut fields)?;
        }
    }

    match cursor.remaining() {
        0 => Ok(fields),
        n => Err(DecodeError::TrailingBytes(n)),
    }
}
