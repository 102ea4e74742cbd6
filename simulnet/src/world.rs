//! The simulated-network controller: owns the simulator process, injects
//! account state, drives the simulated clock and hands out wallet/contract
//! fixtures layered over the sdk pipeline.

use std::sync::Arc;

use log::{info, trace};
use serde_json::{json, Value};
use tokio::process::Child;

use mvx_sdk::{
    AccountSnapshot, Address, CallContractResult, CallContractTx, CodeMetadata,
    DeployContractResult, DeployContractTx, DummySigner, Gateway, GatewayConfig, Kvs, Query,
    QueryResult, Signer, TokenTransfer, TransferTx, TxResult, UpgradeContractTx, U256,
};

use crate::account::{self, AccountFixture, SettableAccount};
use crate::config::{SimulnetConfig, SIMULNET_CHAIN_ID};
use crate::error::SimulnetError;
use crate::process;

/// A locally-simulated network.
///
/// The controller exclusively owns its child process: only the controller
/// injects state or terminates it. Instances are independent; multiple
/// simulated networks can coexist in one test run.
pub struct Simulnet {
    gateway: Gateway,
    child: Option<Child>,
    gas_price: u64,
    chain_id: String,
}

impl Simulnet {
    /// Spawn a simulator process and wait for it to become ready.
    pub async fn start(config: SimulnetConfig) -> Result<Self, SimulnetError> {
        let (child, url) = process::spawn_simulator(&config).await?;
        info!("simulator ready at {}", url);
        let gateway = Gateway::with_config(
            &url,
            GatewayConfig {
                explorer_url: config.explorer_url.clone(),
                ..Default::default()
            },
        )?;
        Ok(Self {
            gateway,
            child: Some(child),
            gas_price: config.gas_price,
            chain_id: SIMULNET_CHAIN_ID.to_owned(),
        })
    }

    /// Attach to an already-running simulator. The resulting controller does
    /// not own a process and cannot be stopped.
    pub fn connect(url: &str, gas_price: u64) -> Result<Self, SimulnetError> {
        let gateway = Gateway::new(url)?;
        Ok(Self {
            gateway,
            child: None,
            gas_price,
            chain_id: SIMULNET_CHAIN_ID.to_owned(),
        })
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub fn gas_price(&self) -> u64 {
        self.gas_price
    }

    /// Terminate the owned simulator process. Stopping a controller without
    /// a running process is a usage error.
    pub async fn stop(&mut self) -> Result<(), SimulnetError> {
        trace!("stop");
        let mut child = self.child.take().ok_or(SimulnetError::NotRunning)?;
        child.kill().await?;
        Ok(())
    }

    // ========== Privileged state injection ==========

    /// Overwrite or create account records directly, bypassing transaction
    /// execution. `file:` code references are expanded before injection.
    pub async fn set_accounts(&self, accounts: &[SettableAccount]) -> Result<(), SimulnetError> {
        trace!("set_accounts: {}", accounts.len());
        let mut states = Vec::with_capacity(accounts.len());
        for account in accounts {
            states.push(account.to_state_value().await?);
        }
        self.gateway
            .fetch("/simulator/set-state", Some(&Value::Array(states)))
            .await?;
        Ok(())
    }

    pub async fn set_account(&self, account: &SettableAccount) -> Result<(), SimulnetError> {
        self.set_accounts(std::slice::from_ref(account)).await
    }

    /// Wallets funded by the simulator at genesis
    pub async fn get_initial_wallets(&self) -> Result<Value, SimulnetError> {
        trace!("get_initial_wallets");
        Ok(self.gateway.fetch("/simulator/initial-wallets", None).await?)
    }

    // ========== Simulated clock ==========

    pub async fn generate_blocks(&self, blocks: u64) -> Result<(), SimulnetError> {
        trace!("generate_blocks: {}", blocks);
        self.gateway
            .fetch(
                &format!("/simulator/generate-blocks/{}", blocks),
                Some(&json!({})),
            )
            .await?;
        Ok(())
    }

    pub async fn advance_to_epoch(&self, epoch: u64) -> Result<(), SimulnetError> {
        trace!("advance_to_epoch: {}", epoch);
        self.gateway
            .fetch(
                &format!("/simulator/generate-blocks-until-epoch-reached/{}", epoch),
                Some(&json!({})),
            )
            .await?;
        Ok(())
    }

    /// Advance by a delta from the current epoch
    pub async fn advance_epoch(&self, epochs: u64) -> Result<(), SimulnetError> {
        let status = self.gateway.get_network_status(0).await?;
        self.advance_to_epoch(status.epoch + epochs).await
    }

    /// Generate blocks until the given transaction has been processed
    pub async fn process_tx(&self, tx_hash: &str) -> Result<(), SimulnetError> {
        trace!("process_tx: {}", tx_hash);
        self.gateway
            .fetch(
                &format!(
                    "/simulator/generate-blocks-until-transaction-processed/{}",
                    tx_hash
                ),
                Some(&json!({})),
            )
            .await?;
        Ok(())
    }

    // ========== Fixture handles ==========

    pub fn new_wallet(&self, signer: Arc<dyn Signer>) -> SimWallet {
        SimWallet {
            gateway: self.gateway.clone(),
            signer,
            gas_price: self.gas_price,
            chain_id: self.chain_id.clone(),
        }
    }

    pub fn new_contract(&self, address: Address) -> SimContract {
        SimContract {
            gateway: self.gateway.clone(),
            address,
        }
    }

    /// Create wallets at generated addresses with the given state
    pub async fn create_wallets(
        &self,
        fixtures: Vec<AccountFixture>,
    ) -> Result<Vec<SimWallet>, SimulnetError> {
        let accounts: Vec<SettableAccount> = fixtures
            .into_iter()
            .map(|fixture| fixture.into_settable(account::generated_wallet_address()))
            .collect();
        self.set_accounts(&accounts).await?;
        Ok(accounts
            .iter()
            .map(|account| self.new_wallet(Arc::new(DummySigner::new(account.address))))
            .collect())
    }

    pub async fn create_wallet(&self, fixture: AccountFixture) -> Result<SimWallet, SimulnetError> {
        let mut wallets = self.create_wallets(vec![fixture]).await?;
        Ok(wallets.remove(0))
    }

    /// Create contracts at generated VM addresses with the given state
    pub async fn create_contracts(
        &self,
        fixtures: Vec<AccountFixture>,
    ) -> Result<Vec<SimContract>, SimulnetError> {
        let accounts: Vec<SettableAccount> = fixtures
            .into_iter()
            .map(|fixture| fixture.into_settable(account::generated_contract_address()))
            .collect();
        self.set_accounts(&accounts).await?;
        Ok(accounts
            .iter()
            .map(|account| self.new_contract(account.address))
            .collect())
    }

    pub async fn create_contract(
        &self,
        fixture: AccountFixture,
    ) -> Result<SimContract, SimulnetError> {
        let mut contracts = self.create_contracts(vec![fixture]).await?;
        Ok(contracts.remove(0))
    }
}

/// Transfer parameters for a fixture wallet; nonce, gas price and chain id
/// are filled in by the wallet.
#[derive(Debug, Clone, Default)]
pub struct SimTransfer {
    pub receiver: Address,
    pub value: U256,
    pub gas_limit: u64,
    pub esdts: Vec<TokenTransfer>,
}

#[derive(Debug, Clone, Default)]
pub struct SimDeploy {
    pub value: U256,
    pub gas_limit: u64,
    pub code: String,
    pub code_metadata: CodeMetadata,
    pub code_args: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SimCall {
    pub callee: Address,
    pub value: U256,
    pub gas_limit: u64,
    pub func_name: String,
    pub func_args: Vec<String>,
    pub esdts: Vec<TokenTransfer>,
}

#[derive(Debug, Clone, Default)]
pub struct SimUpgrade {
    pub callee: Address,
    pub value: U256,
    pub gas_limit: u64,
    pub code: String,
    pub code_metadata: CodeMetadata,
    pub code_args: Vec<String>,
}

/// Client-side wallet handle: a signer plus the gateway, with nonce and gas
/// price auto-filled for each transaction. Pure composition over the
/// pipeline; no extra protocol behavior.
#[derive(Clone)]
pub struct SimWallet {
    gateway: Gateway,
    signer: Arc<dyn Signer>,
    gas_price: u64,
    chain_id: String,
}

impl SimWallet {
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn signer(&self) -> Arc<dyn Signer> {
        Arc::clone(&self.signer)
    }

    pub async fn get_nonce(&self) -> Result<u64, SimulnetError> {
        Ok(self.gateway.get_account_nonce(&self.address(), None).await?)
    }

    pub async fn get_balance(&self) -> Result<U256, SimulnetError> {
        Ok(self
            .gateway
            .get_account_balance(&self.address(), None)
            .await?)
    }

    pub async fn get_account(&self) -> Result<AccountSnapshot, SimulnetError> {
        Ok(self.gateway.get_account(&self.address(), None).await?)
    }

    pub async fn transfer(&self, params: SimTransfer) -> Result<TxResult, SimulnetError> {
        let nonce = self.get_nonce().await?;
        Ok(self
            .gateway
            .transfer(TransferTx {
                nonce,
                value: params.value,
                receiver: params.receiver,
                sender: self.signer(),
                gas_price: self.gas_price,
                gas_limit: params.gas_limit,
                esdts: params.esdts,
                chain_id: self.chain_id.clone(),
            })
            .await?)
    }

    pub async fn deploy_contract(
        &self,
        params: SimDeploy,
    ) -> Result<DeployContractResult, SimulnetError> {
        let nonce = self.get_nonce().await?;
        Ok(self
            .gateway
            .deploy_contract(DeployContractTx {
                nonce,
                value: params.value,
                sender: self.signer(),
                gas_price: self.gas_price,
                gas_limit: params.gas_limit,
                code: params.code,
                code_metadata: params.code_metadata,
                code_args: params.code_args,
                chain_id: self.chain_id.clone(),
            })
            .await?)
    }

    pub async fn call_contract(
        &self,
        params: SimCall,
    ) -> Result<CallContractResult, SimulnetError> {
        let nonce = self.get_nonce().await?;
        Ok(self
            .gateway
            .call_contract(CallContractTx {
                nonce,
                value: params.value,
                callee: params.callee,
                sender: self.signer(),
                gas_price: self.gas_price,
                gas_limit: params.gas_limit,
                func_name: params.func_name,
                func_args: params.func_args,
                esdts: params.esdts,
                chain_id: self.chain_id.clone(),
            })
            .await?)
    }

    pub async fn upgrade_contract(
        &self,
        params: SimUpgrade,
    ) -> Result<CallContractResult, SimulnetError> {
        let nonce = self.get_nonce().await?;
        Ok(self
            .gateway
            .upgrade_contract(UpgradeContractTx {
                nonce,
                value: params.value,
                callee: params.callee,
                sender: self.signer(),
                gas_price: self.gas_price,
                gas_limit: params.gas_limit,
                code: params.code,
                code_metadata: params.code_metadata,
                code_args: params.code_args,
                chain_id: self.chain_id.clone(),
            })
            .await?)
    }
}

/// Client-side contract handle for reads and queries
#[derive(Debug, Clone)]
pub struct SimContract {
    gateway: Gateway,
    address: Address,
}

impl SimContract {
    pub fn address(&self) -> Address {
        self.address
    }

    pub async fn get_balance(&self) -> Result<U256, SimulnetError> {
        Ok(self.gateway.get_account_balance(&self.address, None).await?)
    }

    pub async fn get_account(&self) -> Result<AccountSnapshot, SimulnetError> {
        Ok(self.gateway.get_account(&self.address, None).await?)
    }

    pub async fn get_kvs(&self) -> Result<Kvs, SimulnetError> {
        Ok(self.gateway.get_account_kvs(&self.address, None).await?)
    }

    pub async fn query(
        &self,
        func_name: &str,
        func_args: Vec<String>,
    ) -> Result<QueryResult, SimulnetError> {
        Ok(self
            .gateway
            .query(&Query {
                callee: self.address,
                func_name: func_name.to_owned(),
                func_args,
                caller: None,
                value: None,
            })
            .await?)
    }
}
