//! The send → await → resolve protocol, one state machine per submitted
//! transaction. Send and resolve are single round trips; await polls the
//! process status at a fixed interval until the transaction settles.

use std::time::Duration;

use log::trace;
use serde_json::Value;
use tokio::time::{sleep, timeout};

use crate::config::TX_POLL_INTERVAL;
use crate::error::ClientError;
use crate::gateway::{malformed, Gateway};

use super::result::{self, CallContractResult, DeployContractResult, TxResult};
use super::{CallContractTx, DeployContractTx, RawTx, TransferTx, TxIntent, UpgradeContractTx};

impl Gateway {
    /// Submit an already-signed raw transaction
    pub async fn send_raw_tx(&self, raw: &RawTx) -> Result<String, ClientError> {
        trace!("send_raw_tx");
        let data = self
            .fetch("/transaction/send", Some(&serde_json::to_value(raw)?))
            .await?;
        data.get("txHash")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| malformed("missing txHash").into())
    }

    /// Encode, sign and submit an intent. Signing or submission failures are
    /// fatal to the operation; nothing is retried.
    pub async fn send_tx(&self, intent: TxIntent) -> Result<String, ClientError> {
        let raw = intent.into_raw_tx().await?;
        self.send_raw_tx(&raw).await
    }

    pub async fn send_transfer(&self, tx: TransferTx) -> Result<String, ClientError> {
        trace!("send_transfer");
        self.send_tx(tx.into()).await
    }

    pub async fn send_deploy_contract(&self, tx: DeployContractTx) -> Result<String, ClientError> {
        trace!("send_deploy_contract");
        self.send_tx(tx.into()).await
    }

    pub async fn send_call_contract(&self, tx: CallContractTx) -> Result<String, ClientError> {
        trace!("send_call_contract");
        self.send_tx(tx.into()).await
    }

    pub async fn send_upgrade_contract(
        &self,
        tx: UpgradeContractTx,
    ) -> Result<String, ClientError> {
        trace!("send_upgrade_contract");
        self.send_tx(tx.into()).await
    }

    pub async fn get_tx_process_status(&self, tx_hash: &str) -> Result<String, ClientError> {
        trace!("get_tx_process_status: {}", tx_hash);
        let data = self
            .fetch(&format!("/transaction/{}/process-status", tx_hash), None)
            .await?;
        data.get("status")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| malformed("missing process status").into())
    }

    /// Settled snapshot, results included
    pub async fn get_tx(&self, tx_hash: &str) -> Result<Value, ClientError> {
        self.tx_snapshot(tx_hash, true).await
    }

    pub async fn get_tx_without_results(&self, tx_hash: &str) -> Result<Value, ClientError> {
        self.tx_snapshot(tx_hash, false).await
    }

    async fn tx_snapshot(&self, tx_hash: &str, with_results: bool) -> Result<Value, ClientError> {
        trace!("tx_snapshot: {}", tx_hash);
        let mut path = format!("/transaction/{}", tx_hash);
        if with_results {
            path.push_str("?withResults=true");
        }
        let data = self.fetch(&path, None).await?;
        data.get("transaction")
            .cloned()
            .ok_or_else(|| malformed("missing transaction").into())
    }

    /// Block until the transaction leaves pending state.
    ///
    /// There is no built-in bound; an unreachable gateway fails the poll
    /// immediately rather than being retried. Use `await_tx_within` for an
    /// explicit deadline.
    pub async fn await_tx(&self, tx_hash: &str) -> Result<(), ClientError> {
        trace!("await_tx: {}", tx_hash);
        let mut status = self.get_tx_process_status(tx_hash).await?;
        while status == "pending" {
            sleep(TX_POLL_INTERVAL).await;
            status = self.get_tx_process_status(tx_hash).await?;
        }
        Ok(())
    }

    /// `await_tx` with a deadline; expiry surfaces a distinct timeout error.
    pub async fn await_tx_within(
        &self,
        tx_hash: &str,
        limit: Duration,
    ) -> Result<(), ClientError> {
        match timeout(limit, self.await_tx(tx_hash)).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::Timeout {
                hash: tx_hash.to_owned(),
                timeout: limit,
            }),
        }
    }

    /// Fetch and decode a settled transaction. Resolving a transaction still
    /// observed as pending is an error, not a wait.
    pub async fn resolve_tx(&self, tx_hash: &str) -> Result<TxResult, ClientError> {
        trace!("resolve_tx: {}", tx_hash);
        if self.get_tx_process_status(tx_hash).await? == "pending" {
            return Err(ClientError::StillPending {
                hash: tx_hash.to_owned(),
            });
        }
        let tx = self.get_tx(tx_hash).await?;
        let explorer_url = format!("{}/transactions/{}", self.explorer_url(), tx_hash);
        result::decode_tx(tx_hash, explorer_url, tx)
    }

    pub async fn resolve_transfer(&self, tx_hash: &str) -> Result<TxResult, ClientError> {
        self.resolve_tx(tx_hash).await
    }

    pub async fn resolve_call_contract(
        &self,
        tx_hash: &str,
    ) -> Result<CallContractResult, ClientError> {
        let res = self.resolve_tx(tx_hash).await?;
        let return_data = result::tx_return_data(tx_hash, &res.tx)?;
        Ok(CallContractResult::from_tx_result(res, return_data))
    }

    pub async fn resolve_upgrade_contract(
        &self,
        tx_hash: &str,
    ) -> Result<CallContractResult, ClientError> {
        self.resolve_call_contract(tx_hash).await
    }

    pub async fn resolve_deploy_contract(
        &self,
        tx_hash: &str,
    ) -> Result<DeployContractResult, ClientError> {
        let res = self.resolve_tx(tx_hash).await?;
        let return_data = result::tx_return_data(tx_hash, &res.tx)?;
        let address = result::deployed_address(tx_hash, &res.tx)?;
        Ok(DeployContractResult::from_tx_result(
            res,
            return_data,
            address,
        ))
    }

    /// send → await → resolve for a raw intent
    pub async fn execute_tx(&self, intent: TxIntent) -> Result<TxResult, ClientError> {
        let tx_hash = self.send_tx(intent).await?;
        self.await_tx(&tx_hash).await?;
        self.resolve_tx(&tx_hash).await
    }

    /// send → await → resolve for a transfer
    pub async fn transfer(&self, tx: TransferTx) -> Result<TxResult, ClientError> {
        let tx_hash = self.send_transfer(tx).await?;
        self.await_tx(&tx_hash).await?;
        self.resolve_transfer(&tx_hash).await
    }

    /// send → await → resolve for a contract deployment
    pub async fn deploy_contract(
        &self,
        tx: DeployContractTx,
    ) -> Result<DeployContractResult, ClientError> {
        let tx_hash = self.send_deploy_contract(tx).await?;
        self.await_tx(&tx_hash).await?;
        self.resolve_deploy_contract(&tx_hash).await
    }

    /// send → await → resolve for a contract call
    pub async fn call_contract(
        &self,
        tx: CallContractTx,
    ) -> Result<CallContractResult, ClientError> {
        let tx_hash = self.send_call_contract(tx).await?;
        self.await_tx(&tx_hash).await?;
        self.resolve_call_contract(&tx_hash).await
    }

    /// send → await → resolve for a contract upgrade
    pub async fn upgrade_contract(
        &self,
        tx: UpgradeContractTx,
    ) -> Result<CallContractResult, ClientError> {
        let tx_hash = self.send_upgrade_contract(tx).await?;
        self.await_tx(&tx_hash).await?;
        self.resolve_upgrade_contract(&tx_hash).await
    }
}
