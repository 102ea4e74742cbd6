pub mod config;
pub mod data;
pub mod error;
pub mod gateway;
pub mod signer;
pub mod tx;

pub use data::{Address, CodeMetadata, Kvs};
pub use error::{ClientError, GatewayError, InteractionError, InteractionKind, SignerError};
pub use gateway::{AccountSnapshot, Gateway, GatewayConfig, NetworkStatus, Query, QueryResult};
pub use signer::{DummySigner, Signer};
pub use tx::{
    CallContractResult, CallContractTx, DeployContractResult, DeployContractTx, RawTx,
    TokenTransfer, TransferTx, TxAction, TxIntent, TxResult, UpgradeContractTx,
};

/// Re-export of the integer type used for values, balances and fees
pub use primitive_types::U256;
