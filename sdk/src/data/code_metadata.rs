use std::fmt;

use serde::{Deserialize, Serialize};

/// Contract code metadata flags, serialized as two big-endian bytes.
///
/// Byte zero carries upgradeable (0x01) and readable (0x04), byte one carries
/// payable (0x02) and payable-by-contract (0x04).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeMetadata {
    pub upgradeable: bool,
    pub readable: bool,
    pub payable: bool,
    pub payable_by_sc: bool,
}

impl CodeMetadata {
    pub const fn new(upgradeable: bool, readable: bool, payable: bool, payable_by_sc: bool) -> Self {
        Self {
            upgradeable,
            readable,
            payable,
            payable_by_sc,
        }
    }

    /// Two-byte hex form used in deploy/upgrade payloads and account state.
    pub fn to_hex(&self) -> String {
        let byte_zero =
            if self.upgradeable { 0x01u8 } else { 0 } | if self.readable { 0x04 } else { 0 };
        let byte_one =
            if self.payable { 0x02u8 } else { 0 } | if self.payable_by_sc { 0x04 } else { 0 };
        format!("{:02x}{:02x}", byte_zero, byte_one)
    }
}

impl Default for CodeMetadata {
    // upgradeable + readable, the usual deploy metadata
    fn default() -> Self {
        Self::new(true, true, false, false)
    }
}

impl fmt::Display for CodeMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
