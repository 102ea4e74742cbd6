mod address;
mod code_metadata;
mod codec;

pub mod bech32;

pub use address::{Address, AddressError, ADDRESS_HRP, ADDRESS_LEN};
pub use code_metadata::CodeMetadata;
pub use codec::{
    base64_decode, base64_encode, base64_to_hex, base64_to_utf8, top_encode_address,
    top_encode_bool, top_encode_bytes, top_encode_str, top_encode_u64, top_encode_uint, CodecError,
};

use indexmap::IndexMap;

/// Ordered key-value storage pairs of an account, hex encoded on both sides
pub type Kvs = IndexMap<String, String>;
