use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::bech32::{self, Bech32Error};

/// Length in bytes of an account address
pub const ADDRESS_LEN: usize = 32;

/// Human-readable part of the bech32 address form
pub const ADDRESS_HRP: &str = "erd";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("invalid address length: {0} bytes")]
    InvalidLength(usize),

    #[error("invalid hex address: {0}")]
    InvalidHex(String),

    #[error("invalid bech32 address: {0}")]
    Bech32(#[from] Bech32Error),

    #[error("wrong address prefix: expected {ADDRESS_HRP}, got {0}")]
    WrongHrp(String),
}

/// A 32-byte account address, carrying both a bech32 and a hex form.
///
/// The bech32 form is used in transaction envelopes and gateway paths, the
/// hex form inside `@`-joined data payloads.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// The all-zero address, receiver of contract deployments
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(slice: &[u8]) -> Result<Self, AddressError> {
        let bytes: [u8; ADDRESS_LEN] = slice
            .try_into()
            .map_err(|_| AddressError::InvalidLength(slice.len()))?;
        Ok(Self(bytes))
    }

    pub fn from_hex(encoded: &str) -> Result<Self, AddressError> {
        let bytes =
            hex::decode(encoded).map_err(|_| AddressError::InvalidHex(encoded.to_owned()))?;
        Self::from_slice(&bytes)
    }

    pub fn from_bech32(encoded: &str) -> Result<Self, AddressError> {
        let (hrp, payload) = bech32::decode(encoded)?;
        if hrp != ADDRESS_HRP {
            return Err(AddressError::WrongHrp(hrp));
        }
        Self::from_slice(&payload)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn to_bech32(&self) -> String {
        // encoding 32 fixed bytes under a valid hrp cannot fail
        bech32::encode(ADDRESS_HRP, &self.0).expect("bech32 encoding of a 32-byte address")
    }

    /// Contract addresses carry a fixed zero prefix assigned by the protocol.
    pub fn is_contract(&self) -> bool {
        self.0[..8].iter().all(|b| *b == 0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_bech32())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_bech32())
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    // Accepts both address forms: bech32 and 64-char hex
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with(ADDRESS_HRP) && s.as_bytes().get(ADDRESS_HRP.len()) == Some(&b'1') {
            Self::from_bech32(s)
        } else {
            Self::from_hex(s)
        }
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_bech32())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_str(&s).map_err(de::Error::custom)
    }
}
