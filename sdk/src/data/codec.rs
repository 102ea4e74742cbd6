//! Top-encoding helpers: the canonical minimal-byte-length hex encoding used
//! for values inside `@`-joined argument lists, plus the base64 conversions
//! applied to raw transaction data and event payloads.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use primitive_types::U256;
use thiserror::Error;

use super::address::Address;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(String),

    #[error("invalid utf-8 payload")]
    InvalidUtf8,
}

/// Minimal big-endian hex of an unsigned integer. Zero has no bytes and
/// encodes to the empty string.
pub fn top_encode_u64(value: u64) -> String {
    if value == 0 {
        return String::new();
    }
    let bytes = value.to_be_bytes();
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    hex::encode(&bytes[start..])
}

/// Minimal big-endian hex of a 256-bit unsigned integer.
pub fn top_encode_uint(value: &U256) -> String {
    if value.is_zero() {
        return String::new();
    }
    let bytes = value.to_big_endian();
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    hex::encode(&bytes[start..])
}

/// UTF-8 bytes of a string, hex encoded.
pub fn top_encode_str(value: &str) -> String {
    hex::encode(value.as_bytes())
}

pub fn top_encode_bytes(value: &[u8]) -> String {
    hex::encode(value)
}

/// Addresses appear as their full 32-byte hex form inside data payloads.
pub fn top_encode_address(value: &Address) -> String {
    value.to_hex()
}

pub fn top_encode_bool(value: bool) -> String {
    if value {
        "01".to_owned()
    } else {
        String::new()
    }
}

pub fn base64_encode(payload: &[u8]) -> String {
    BASE64.encode(payload)
}

pub fn base64_decode(encoded: &str) -> Result<Vec<u8>, CodecError> {
    BASE64
        .decode(encoded)
        .map_err(|_| CodecError::InvalidBase64(encoded.to_owned()))
}

pub fn base64_to_utf8(encoded: &str) -> Result<String, CodecError> {
    String::from_utf8(base64_decode(encoded)?).map_err(|_| CodecError::InvalidUtf8)
}

pub fn base64_to_hex(encoded: &str) -> Result<String, CodecError> {
    Ok(hex::encode(base64_decode(encoded)?))
}
