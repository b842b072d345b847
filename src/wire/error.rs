// src/wire/error.rs

/// Why a received payload could not be decoded into a field map.
///
/// Every variant means the whole message is dropped; no partial field map is
/// ever handed on.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum DecodeError {
    /// Input buffer was empty.
    #[error("Empty payload")]
    Empty,

    /// Payload is longer than `MAX_PAYLOAD_LEN`.
    #[error("Payload too large: {0} bytes")]
    PayloadTooLarge(usize),

    /// A header, length prefix or value runs past the end of the buffer.
    #[error("Payload truncated")]
    Truncated,

    /// The top-level data item is not a map.
    #[error("Top-level item is not a map (initial byte {0:#04x})")]
    NotAMap(u8),

    /// A map key is not a definite-length text string.
    #[error("Map key is not a text string (initial byte {0:#04x})")]
    NonTextKey(u8),

    /// Value type not carried by sensor messages (arrays, nested maps, tags,
    /// simple values, indefinite strings, reserved encodings).
    #[error("Unsupported value type (initial byte {0:#04x})")]
    UnsupportedType(u8),

    /// Integer does not fit in an `i64`.
    #[error("Integer out of range")]
    IntegerOverflow,

    /// Text string is not valid UTF-8.
    #[error("Invalid UTF-8 in text string")]
    InvalidUtf8,

    /// Map has more pairs than `MAX_FIELDS`.
    #[error("Too many fields in message")]
    TooManyFields,

    /// Bytes remain after the top-level map.
    #[error("{0} trailing bytes after message")]
    TrailingBytes(usize),
}

impl From<core::str::Utf8Error> for DecodeError {
    fn from(_: core::str::Utf8Error) -> Self {
        DecodeError::InvalidUtf8
    }
}
