//! Account records injected into the simulator through the privileged
//! set-state endpoint, and the generated addresses used for test fixtures.

use rand::RngCore;
use serde_json::{json, Value};

use mvx_sdk::{Address, CodeMetadata, Kvs, U256};

use crate::error::SimulnetError;

/// Full account record for the privileged set-state endpoint. Unset fields
/// are injected with protocol defaults.
#[derive(Debug, Clone, Default)]
pub struct SettableAccount {
    pub address: Address,
    pub nonce: Option<u64>,
    pub balance: Option<U256>,
    /// Contract code: hex, or a `file:<path>` reference expanded to the hex
    /// of the file contents before injection
    pub code: Option<String>,
    pub code_hash: Option<String>,
    pub code_metadata: Option<CodeMetadata>,
    pub owner: Option<Address>,
    pub kvs: Kvs,
}

impl SettableAccount {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            ..Default::default()
        }
    }

    /// Wire form for set-state, with `file:` code references expanded
    pub(crate) async fn to_state_value(&self) -> Result<Value, SimulnetError> {
        let code = match &self.code {
            Some(code) => Some(expand_code(code).await?),
            None => None,
        };
        let mut state = json!({
            "address": self.address.to_bech32(),
            "nonce": self.nonce.unwrap_or(0),
            "balance": self.balance.unwrap_or_default().to_string(),
            "keys": self.kvs,
        });
        let fields = state.as_object_mut().expect("state is an object");
        if let Some(code) = code {
            fields.insert("code".to_owned(), json!(code));
        }
        if let Some(code_hash) = &self.code_hash {
            fields.insert("codeHash".to_owned(), json!(code_hash));
        }
        if let Some(metadata) = &self.code_metadata {
            fields.insert("codeMetadata".to_owned(), json!(metadata.to_hex()));
        }
        if let Some(owner) = &self.owner {
            fields.insert("ownerAddress".to_owned(), json!(owner.to_bech32()));
        }
        Ok(state)
    }
}

/// Account state for a generated fixture account; the address is derived by
/// the controller.
#[derive(Debug, Clone, Default)]
pub struct AccountFixture {
    pub nonce: Option<u64>,
    pub balance: Option<U256>,
    pub code: Option<String>,
    pub code_metadata: Option<CodeMetadata>,
    pub owner: Option<Address>,
    pub kvs: Kvs,
}

impl AccountFixture {
    pub fn balance(balance: impl Into<U256>) -> Self {
        Self {
            balance: Some(balance.into()),
            ..Default::default()
        }
    }

    pub(crate) fn into_settable(self, address: Address) -> SettableAccount {
        SettableAccount {
            address,
            nonce: self.nonce,
            balance: self.balance,
            code: self.code,
            code_hash: None,
            code_metadata: self.code_metadata,
            owner: self.owner,
            kvs: self.kvs,
        }
    }
}

pub(crate) fn generated_wallet_address() -> Address {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    Address::from_bytes(bytes)
}

// Contract addresses carry the 8-byte zero prefix and the VM type tag the
// protocol assigns to deployed contracts, so injected contracts are routable
// like real deployments.
pub(crate) fn generated_contract_address() -> Address {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes[10..]);
    bytes[8] = 0x05;
    bytes[9] = 0x00;
    Address::from_bytes(bytes)
}

pub(crate) async fn expand_code(code: &str) -> Result<String, SimulnetError> {
    match code.strip_prefix("file:") {
        Some(path) => {
            let bytes =
                tokio::fs::read(path)
                    .await
                    .map_err(|source| SimulnetError::CodeExpansion {
                        path: path.to_owned(),
                        source,
                    })?;
            Ok(hex::encode(bytes))
        }
        None => Ok(code.to_owned()),
    }
}
