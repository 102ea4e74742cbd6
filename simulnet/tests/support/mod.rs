//! In-process mock of the simulator gateway: privileged set-state and
//! clock endpoints backed by a shared account map, plus the account reads
//! the sdk performs against it.

// not every test binary exercises every route
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

type Shared = Arc<Mutex<MockState>>;

#[derive(Default)]
pub struct MockState {
    /// Injected account state keyed by bech32 address
    pub accounts: HashMap<String, Value>,
    /// Simulator endpoints hit, in call order
    pub simulator_calls: Vec<String>,
    pub epoch: u64,
}

pub struct MockSimulator {
    pub url: String,
    pub state: Shared,
}

impl MockSimulator {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(MockState::default()));
        let app = Router::new()
            .route("/simulator/set-state", post(set_state))
            .route("/simulator/initial-wallets", get(initial_wallets))
            .route("/simulator/generate-blocks/{blocks}", post(simulator_call))
            .route(
                "/simulator/generate-blocks-until-epoch-reached/{epoch}",
                post(simulator_call),
            )
            .route(
                "/simulator/generate-blocks-until-transaction-processed/{hash}",
                post(simulator_call),
            )
            .route("/address/{address}/nonce", get(account_nonce))
            .route("/address/{address}/balance", get(account_balance))
            .route("/address/{address}/keys", get(account_keys))
            .route("/address/{address}", get(account))
            .route("/network/status/{shard}", get(network_status))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock simulator");
        let url = format!("http://{}", listener.local_addr().expect("local addr"));
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve mock simulator");
        });
        Self { url, state }
    }

    pub fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state poisoned")
    }

    /// Host:port part of the mock URL, as printed by a real simulator
    pub fn bound_address(&self) -> &str {
        self.url.trim_start_matches("http://")
    }
}

fn ok(data: Value) -> Json<Value> {
    Json(json!({"data": data, "error": "", "code": "successful"}))
}

async fn set_state(State(state): State<Shared>, Json(body): Json<Vec<Value>>) -> Json<Value> {
    let mut state = state.lock().expect("mock state poisoned");
    for account in body {
        let address = account["address"].as_str().expect("account address").to_owned();
        state.accounts.insert(address, account);
    }
    ok(json!({}))
}

async fn initial_wallets(State(_state): State<Shared>) -> Json<Value> {
    ok(json!({"balanceWallets": {}, "stakeWallets": []}))
}

async fn simulator_call(
    State(state): State<Shared>,
    axum::extract::OriginalUri(uri): axum::extract::OriginalUri,
) -> Json<Value> {
    let mut state = state.lock().expect("mock state poisoned");
    state.simulator_calls.push(uri.path().to_owned());
    ok(json!({}))
}

async fn account_nonce(State(state): State<Shared>, Path(address): Path<String>) -> Json<Value> {
    let state = state.lock().expect("mock state poisoned");
    let nonce = state
        .accounts
        .get(&address)
        .and_then(|a| a.get("nonce").cloned())
        .unwrap_or_else(|| json!(0));
    ok(json!({"nonce": nonce}))
}

async fn account_balance(State(state): State<Shared>, Path(address): Path<String>) -> Json<Value> {
    let state = state.lock().expect("mock state poisoned");
    let balance = state
        .accounts
        .get(&address)
        .and_then(|a| a.get("balance").cloned())
        .unwrap_or_else(|| json!("0"));
    ok(json!({"balance": balance}))
}

async fn account_keys(State(state): State<Shared>, Path(address): Path<String>) -> Json<Value> {
    let state = state.lock().expect("mock state poisoned");
    let pairs = state
        .accounts
        .get(&address)
        .and_then(|a| a.get("keys").cloned())
        .unwrap_or_else(|| json!({}));
    ok(json!({"pairs": pairs}))
}

async fn account(State(state): State<Shared>, Path(address): Path<String>) -> Json<Value> {
    let state = state.lock().expect("mock state poisoned");
    let mut account = state
        .accounts
        .get(&address)
        .cloned()
        .unwrap_or_else(|| json!({"nonce": 0, "balance": "0"}));
    if let Some(fields) = account.as_object_mut() {
        fields.insert("address".to_owned(), json!(address));
        fields.remove("keys");
    }
    ok(json!({"account": account}))
}

async fn network_status(State(state): State<Shared>, Path(_shard): Path<u32>) -> Json<Value> {
    let state = state.lock().expect("mock state poisoned");
    ok(json!({"status": {
        "erd_block_timestamp": 1700000000u64,
        "erd_cross_check_block_height": "0",
        "erd_current_round": 10,
        "erd_epoch_number": state.epoch,
        "erd_highest_final_nonce": 9,
        "erd_nonce": 10,
        "erd_nonce_at_epoch_start": 0,
        "erd_nonces_passed_in_current_epoch": 10,
        "erd_round_at_epoch_start": 0,
        "erd_rounds_passed_in_current_epoch": 10,
        "erd_rounds_per_epoch": 20,
    }}))
}
