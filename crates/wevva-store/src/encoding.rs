//! Fixed-width key and value encoding.
//!
//! Keys are Unix timestamps (seconds) stored as 8-byte big-endian unsigned
//! integers, so byte order and chronological order agree. Values are the
//! IEEE-754 bit pattern of an `f64`, also big-endian.
//!
//! Negative timestamps are reinterpreted as their two's complement `u64`.
//! They round-trip exactly but sort after every non-negative timestamp.

/// Width in bytes of every encoded key and value.
pub const ENCODED_LEN: usize = 8;

/// Encode a Unix timestamp as a bucket key.
#[must_use]
pub fn encode_key(timestamp: i64) -> [u8; ENCODED_LEN] {
    (timestamp as u64).to_be_bytes()
}

/// Decode a bucket key back into a Unix timestamp.
#[must_use]
pub fn decode_key(bytes: [u8; ENCODED_LEN]) -> i64 {
    u64::from_be_bytes(bytes) as i64
}

/// Encode a reading as a bucket value.
#[must_use]
pub fn encode_value(value: f64) -> [u8; ENCODED_LEN] {
    value.to_bits().to_be_bytes()
}

/// Decode a bucket value back into a reading.
#[must_use]
pub fn decode_value(bytes: [u8; ENCODED_LEN]) -> f64 {
    f64::from_bits(u64::from_be_bytes(bytes))
}

/// Decode a key read back from disk, or `None` if it has the wrong width.
pub fn key_from_slice(bytes: &[u8]) -> Option<i64> {
    bytes.try_into().ok().map(decode_key)
}

/// Decode a value read back from disk, or `None` if it has the wrong width.
pub fn value_from_slice(bytes: &[u8]) -> Option<f64> {
    bytes.try_into().ok().map(decode_value)
}
