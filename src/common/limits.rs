// src/common/limits.rs

// Sizes are chosen for nRF24L01 links (32-byte payloads) with room for
// larger frames from other radios. Everything here is a hard upper bound.

// === Addresses ===

/// Longest accepted sender address, in bytes.
pub const MAX_ADDR_LEN: usize = 16;

// === Wire Messages ===

/// Largest payload the decoder will look at.
pub const MAX_PAYLOAD_LEN: usize = 256;
/// Most field/value pairs accepted in one message.
pub const MAX_FIELDS: usize = 16;

/// Receive buffer handed to `RadioLink::receive`.
pub const RADIO_PACKET_BUF_LEN: usize = MAX_PAYLOAD_LEN;

// === Devices ===

/// Default bound on readings waiting in one device's queue.
/// A message can never carry more than `MAX_FIELDS` readings, so the default
/// leaves room for two full messages.
pub const MAX_QUEUED_READINGS: usize = 2 * MAX_FIELDS;
