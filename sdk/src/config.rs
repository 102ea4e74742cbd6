use std::time::Duration;

/// Gas price used when the caller does not specify one
pub const DEFAULT_GAS_PRICE: u64 = 1_000_000_000;

/// Transaction version sent when the caller does not specify one
pub const DEFAULT_TX_VERSION: u32 = 1;

/// Delay between two process-status polls while a transaction is pending
pub const TX_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// HTTP request timeout for gateway calls
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// TCP connect timeout for gateway calls
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// VM version tag placed after the code in a deploy payload
pub const VM_VERSION_TAG: &str = "0500";

/// Data-field tag of a multi-token transfer
pub const MULTI_TOKEN_TRANSFER_TAG: &str = "MultiESDTNFTTransfer";

/// Data-field tag of a contract upgrade
pub const UPGRADE_CONTRACT_TAG: &str = "upgradeContract";
