//! Settled-outcome decoding: classifies a settled transaction snapshot as
//! success, revert or protocol-level failure, and extracts return data and
//! deployed addresses. Pure; resolving the same snapshot twice yields
//! identical results.

use primitive_types::U256;
use serde_json::Value;

use crate::data::{base64_to_utf8, Address};
use crate::error::{ClientError, InteractionError};
use crate::gateway::{code_string, uint_from_value};

/// Resolution of a settled transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxResult {
    pub hash: String,
    pub explorer_url: String,
    pub gas_used: u64,
    pub fee: U256,
    /// Full settled snapshot as returned by the gateway
    pub tx: Value,
}

/// Resolution of a settled contract call or upgrade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContractResult {
    pub hash: String,
    pub explorer_url: String,
    pub gas_used: u64,
    pub fee: U256,
    /// Top-encoded hex return values
    pub return_data: Vec<String>,
    pub tx: Value,
}

/// Resolution of a settled contract deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployContractResult {
    pub hash: String,
    pub explorer_url: String,
    pub gas_used: u64,
    pub fee: U256,
    pub return_data: Vec<String>,
    /// Address of the deployed contract, from the `SCDeploy` event
    pub address: Address,
    pub tx: Value,
}

impl CallContractResult {
    pub(crate) fn from_tx_result(res: TxResult, return_data: Vec<String>) -> Self {
        Self {
            hash: res.hash,
            explorer_url: res.explorer_url,
            gas_used: res.gas_used,
            fee: res.fee,
            return_data,
            tx: res.tx,
        }
    }
}

impl DeployContractResult {
    pub(crate) fn from_tx_result(
        res: TxResult,
        return_data: Vec<String>,
        address: Address,
    ) -> Self {
        Self {
            hash: res.hash,
            explorer_url: res.explorer_url,
            gas_used: res.gas_used,
            fee: res.fee,
            return_data,
            address,
            tx: res.tx,
        }
    }
}

/// Classify a settled snapshot. Ordered decision list, first match wins:
/// non-success status, then execution-receipt return code, then signalError
/// event, then success.
pub(crate) fn decode_tx(
    hash: &str,
    explorer_url: String,
    tx: Value,
) -> Result<TxResult, ClientError> {
    let status = tx
        .get("status")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed_tx(hash, "missing status"))?;
    if status != "success" {
        let status = status.to_owned();
        return Err(InteractionError::tx("errorStatus", status, tx).into());
    }

    if let Some(return_code) = tx
        .get("executionReceipt")
        .and_then(|receipt| receipt.get("returnCode"))
    {
        let code = code_string(return_code);
        if !return_code.is_null() && !code.is_empty() {
            let message = tx
                .get("executionReceipt")
                .and_then(|receipt| receipt.get("returnMessage"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned();
            return Err(InteractionError::tx(code, message, tx).into());
        }
    }

    if let Some(event) = find_event(&tx, "signalError") {
        let topic = event
            .get("topics")
            .and_then(Value::as_array)
            .and_then(|topics| topics.get(1))
            .and_then(Value::as_str)
            .ok_or_else(|| malformed_tx(hash, "signalError event without error topic"))?;
        let message = base64_to_utf8(topic)
            .map_err(|_| malformed_tx(hash, "undecodable signalError topic"))?;
        return Err(InteractionError::tx("signalError", message, tx).into());
    }

    let gas_used = tx
        .get("gasUsed")
        .and_then(Value::as_u64)
        .ok_or_else(|| malformed_tx(hash, "missing gasUsed"))?;
    let fee = tx
        .get("fee")
        .ok_or_else(|| malformed_tx(hash, "missing fee"))?;
    let fee = uint_from_value(fee, "fee").map_err(|_| malformed_tx(hash, "unparseable fee"))?;

    Ok(TxResult {
        hash: hash.to_owned(),
        explorer_url,
        gas_used,
        fee,
        tx,
    })
}

/// Extract the return values of a successful call.
///
/// A `writeLog` event wins; otherwise the `@6f6b`-marked smart-contract
/// result is used. Both carry `@`-joined segments whose first two entries
/// are status markers. Neither source present means the call returned
/// nothing, which is a valid success.
pub(crate) fn tx_return_data(hash: &str, tx: &Value) -> Result<Vec<String>, ClientError> {
    if let Some(event) = find_event(tx, "writeLog") {
        let data = event
            .get("data")
            .and_then(Value::as_str)
            .ok_or_else(|| malformed_tx(hash, "writeLog event without data"))?;
        let decoded = base64_to_utf8(data)
            .map_err(|_| malformed_tx(hash, "undecodable writeLog data"))?;
        return Ok(split_return_data(&decoded));
    }

    if let Some(results) = tx.get("smartContractResults").and_then(Value::as_array) {
        let ok_marker = results.iter().find_map(|result| {
            result
                .get("data")
                .and_then(Value::as_str)
                .filter(|data| *data == "@6f6b" || data.starts_with("@6f6b@"))
        });
        if let Some(data) = ok_marker {
            return Ok(split_return_data(data));
        }
    }

    Ok(Vec::new())
}

/// Deployed contract address from the `SCDeploy` event. A successful deploy
/// always carries this event; its absence violates the protocol contract.
pub(crate) fn deployed_address(hash: &str, tx: &Value) -> Result<Address, ClientError> {
    let event = find_event(tx, "SCDeploy")
        .ok_or_else(|| malformed_tx(hash, "successful deploy without SCDeploy event"))?;
    let address = event
        .get("address")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed_tx(hash, "SCDeploy event without address"))?;
    Address::from_bech32(address).map_err(|_| malformed_tx(hash, "invalid SCDeploy address"))
}

fn find_event<'a>(tx: &'a Value, identifier: &str) -> Option<&'a Value> {
    tx.get("logs")?
        .get("events")?
        .as_array()?
        .iter()
        .find(|event| event.get("identifier").and_then(Value::as_str) == Some(identifier))
}

fn split_return_data(data: &str) -> Vec<String> {
    data.split('@').skip(2).map(str::to_owned).collect()
}

fn malformed_tx(hash: &str, reason: &str) -> ClientError {
    ClientError::MalformedTx {
        hash: hash.to_owned(),
        reason: reason.to_owned(),
    }
}
