mod encode;
mod pipeline;
mod result;

pub use encode::route;
pub use result::{CallContractResult, DeployContractResult, TxResult};

use std::sync::Arc;

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_TX_VERSION;
use crate::data::{base64_encode, Address, CodeMetadata};
use crate::error::ClientError;
use crate::signer::Signer;

/// A single token attached to a transfer or contract call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTransfer {
    /// Token identifier, e.g. `TOK-123456`
    pub id: String,
    /// NFT/SFT nonce; 0 for fungible tokens
    pub nonce: u64,
    pub amount: U256,
}

impl TokenTransfer {
    pub fn fungible(id: impl Into<String>, amount: impl Into<U256>) -> Self {
        Self {
            id: id.into(),
            nonce: 0,
            amount: amount.into(),
        }
    }

    pub fn nft(id: impl Into<String>, nonce: u64, amount: impl Into<U256>) -> Self {
        Self {
            id: id.into(),
            nonce,
            amount: amount.into(),
        }
    }
}

/// What a transaction does. Closed union, dispatched once at encode time;
/// each variant is a pure data record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxAction {
    Transfer {
        receiver: Address,
        esdts: Vec<TokenTransfer>,
    },
    Deploy {
        /// Contract code, hex encoded
        code: String,
        code_metadata: CodeMetadata,
        /// Already top-encoded hex arguments
        code_args: Vec<String>,
    },
    Call {
        callee: Address,
        func_name: String,
        func_args: Vec<String>,
        esdts: Vec<TokenTransfer>,
    },
    Upgrade {
        callee: Address,
        code: String,
        code_metadata: CodeMetadata,
        code_args: Vec<String>,
    },
    /// Pass-through for already-routed payloads
    Raw {
        receiver: Address,
        data: Option<String>,
    },
}

/// A transaction intent: the action plus its common envelope.
///
/// Created per call, encoded once, submitted once, then only polled; never
/// mutated after signing.
#[derive(Clone)]
pub struct TxIntent {
    pub action: TxAction,
    pub nonce: u64,
    pub value: U256,
    pub sender: Arc<dyn Signer>,
    pub gas_price: u64,
    pub gas_limit: u64,
    pub chain_id: String,
    pub version: u32,
}

/// Plain transfer intent, optionally carrying tokens
#[derive(Clone)]
pub struct TransferTx {
    pub nonce: u64,
    pub value: U256,
    pub receiver: Address,
    pub sender: Arc<dyn Signer>,
    pub gas_price: u64,
    pub gas_limit: u64,
    pub esdts: Vec<TokenTransfer>,
    pub chain_id: String,
}

/// Contract deployment intent
#[derive(Clone)]
pub struct DeployContractTx {
    pub nonce: u64,
    pub value: U256,
    pub sender: Arc<dyn Signer>,
    pub gas_price: u64,
    pub gas_limit: u64,
    pub code: String,
    pub code_metadata: CodeMetadata,
    pub code_args: Vec<String>,
    pub chain_id: String,
}

/// Contract call intent, optionally carrying tokens
#[derive(Clone)]
pub struct CallContractTx {
    pub nonce: u64,
    pub value: U256,
    pub callee: Address,
    pub sender: Arc<dyn Signer>,
    pub gas_price: u64,
    pub gas_limit: u64,
    pub func_name: String,
    pub func_args: Vec<String>,
    pub esdts: Vec<TokenTransfer>,
    pub chain_id: String,
}

/// Contract upgrade intent
#[derive(Clone)]
pub struct UpgradeContractTx {
    pub nonce: u64,
    pub value: U256,
    pub callee: Address,
    pub sender: Arc<dyn Signer>,
    pub gas_price: u64,
    pub gas_limit: u64,
    pub code: String,
    pub code_metadata: CodeMetadata,
    pub code_args: Vec<String>,
    pub chain_id: String,
}

impl From<TransferTx> for TxIntent {
    fn from(tx: TransferTx) -> Self {
        Self {
            action: TxAction::Transfer {
                receiver: tx.receiver,
                esdts: tx.esdts,
            },
            nonce: tx.nonce,
            value: tx.value,
            sender: tx.sender,
            gas_price: tx.gas_price,
            gas_limit: tx.gas_limit,
            chain_id: tx.chain_id,
            version: DEFAULT_TX_VERSION,
        }
    }
}

impl From<DeployContractTx> for TxIntent {
    fn from(tx: DeployContractTx) -> Self {
        Self {
            action: TxAction::Deploy {
                code: tx.code,
                code_metadata: tx.code_metadata,
                code_args: tx.code_args,
            },
            nonce: tx.nonce,
            value: tx.value,
            sender: tx.sender,
            gas_price: tx.gas_price,
            gas_limit: tx.gas_limit,
            chain_id: tx.chain_id,
            version: DEFAULT_TX_VERSION,
        }
    }
}

impl From<CallContractTx> for TxIntent {
    fn from(tx: CallContractTx) -> Self {
        Self {
            action: TxAction::Call {
                callee: tx.callee,
                func_name: tx.func_name,
                func_args: tx.func_args,
                esdts: tx.esdts,
            },
            nonce: tx.nonce,
            value: tx.value,
            sender: tx.sender,
            gas_price: tx.gas_price,
            gas_limit: tx.gas_limit,
            chain_id: tx.chain_id,
            version: DEFAULT_TX_VERSION,
        }
    }
}

impl From<UpgradeContractTx> for TxIntent {
    fn from(tx: UpgradeContractTx) -> Self {
        Self {
            action: TxAction::Upgrade {
                callee: tx.callee,
                code: tx.code,
                code_metadata: tx.code_metadata,
                code_args: tx.code_args,
            },
            nonce: tx.nonce,
            value: tx.value,
            sender: tx.sender,
            gas_price: tx.gas_price,
            gas_limit: tx.gas_limit,
            chain_id: tx.chain_id,
            version: DEFAULT_TX_VERSION,
        }
    }
}

/// Wire form of a transaction. Field order is load-bearing: the signature
/// covers the exact serialization of the unsigned form (signature absent).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTx {
    pub nonce: u64,
    /// Native value, decimal string
    pub value: String,
    pub receiver: String,
    pub sender: String,
    #[serde(rename = "gasPrice")]
    pub gas_price: u64,
    #[serde(rename = "gasLimit")]
    pub gas_limit: u64,
    /// Payload, base64 encoded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(rename = "chainID")]
    pub chain_id: String,
    pub version: u32,
    /// Hex signature; absent on the unsigned form
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl TxIntent {
    /// Route and encode the action, serialize the unsigned wire form, and
    /// sign it with the sender capability.
    pub async fn into_raw_tx(self) -> Result<RawTx, ClientError> {
        let sender = self.sender.address();
        let (receiver, data) = encode::route(&self.action, &sender);
        let mut raw = RawTx {
            nonce: self.nonce,
            value: self.value.to_string(),
            receiver: receiver.to_bech32(),
            sender: sender.to_bech32(),
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            data: data.map(|d| base64_encode(d.as_bytes())),
            chain_id: self.chain_id,
            version: self.version,
            signature: None,
        };
        let unsigned = serde_json::to_vec(&raw)?;
        let signature = self.sender.sign(&unsigned).await?;
        raw.signature = Some(hex::encode(signature));
        Ok(raw)
    }
}
