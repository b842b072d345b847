// src/wire/value.rs

use arrayvec::ArrayVec;
use core::fmt;

use crate::common::limits::MAX_FIELDS;

/// A single decoded value, borrowed from the payload it was decoded from.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum FieldValue<'a> {
    /// Unsigned or negative integer that fits in an `i64`.
    Int(i64),
    /// Half, single or double precision float, widened to `f64`.
    Float(f64),
    Text(&'a str),
    Bytes(&'a [u8]),
}

impl FieldValue<'_> {
    /// Numeric view of the value. Text and bytes have none.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            FieldValue::Int(i) => Some(i as f64),
            FieldValue::Float(f) => Some(f),
            _ => None,
        }
    }

    /// CBOR kind of the value, for logs.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Int(_) => "int",
            FieldValue::Float(_) => "float",
            FieldValue::Text(_) => "text",
            FieldValue::Bytes(_) => "bytes",
        }
    }
}

impl fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Text(s) => write!(f, "{:?}", s),
            FieldValue::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

/// One `name: value` pair from a message.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Field<'a> {
    pub name: &'a str,
    pub value: FieldValue<'a>,
}

/// All pairs of one message, in encoded order. Duplicate names are kept.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldMap<'a> {
    fields: ArrayVec<Field<'a>, MAX_FIELDS>,
}

impl<'a> FieldMap<'a> {
    pub(crate) fn new() -> Self {
        FieldMap { fields: ArrayVec::new() }
    }

    /// Appends a pair, returning it back if the map is full.
    pub(crate) fn try_push(&mut self, field: Field<'a>) -> Result<(), Field<'a>> {
        self.fields.try_push(field).map_err(|e| e.element())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Field<'a>> {
        self.fields.iter()
    }

    /// First value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&FieldValue<'a>> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }
}

impl<'a, 'm> IntoIterator for &'m FieldMap<'a> {
    type Item = &'m Field<'a>;
    type IntoIter = core::slice::Iter<'m, Field<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
