//! In-process mock gateway serving the envelope API over a random local
//! port. Tests queue process statuses and snapshots per transaction hash and
//! inspect what the client actually sent.

// not every test binary exercises every route
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const TX_HASH: &str = "0a1b2c3d4e5f60718293a4b5c6d7e8f90a1b2c3d4e5f60718293a4b5c6d7e8f9";

type Shared = Arc<Mutex<MockState>>;

#[derive(Default)]
pub struct MockState {
    /// Queued process statuses per hash; the last entry repeats forever
    pub statuses: HashMap<String, Vec<String>>,
    /// Settled snapshots per hash
    pub snapshots: HashMap<String, Value>,
    /// Raw transactions received on /transaction/send
    pub sent: Vec<Value>,
    /// Override for the /transaction/send envelope
    pub send_envelope: Option<Value>,
    /// VM outputs returned by /vm-values/query
    pub query_output: Option<Value>,
    /// Queries received on /vm-values/query
    pub queries: Vec<Value>,
    /// Account state keyed by bech32 address
    pub accounts: HashMap<String, Value>,
    /// Network status per shard
    pub network_status: Option<Value>,
}

impl MockState {
    pub fn queue_statuses(&mut self, hash: &str, statuses: &[&str]) {
        self.statuses
            .insert(hash.to_owned(), statuses.iter().map(|s| s.to_string()).collect());
    }

    pub fn set_snapshot(&mut self, hash: &str, snapshot: Value) {
        self.snapshots.insert(hash.to_owned(), snapshot);
    }

    pub fn set_account(&mut self, address: &str, account: Value) {
        self.accounts.insert(address.to_owned(), account);
    }
}

pub struct MockGateway {
    pub url: String,
    pub state: Shared,
}

impl MockGateway {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(MockState::default()));
        let app = Router::new()
            .route("/transaction/send", post(send_tx))
            .route("/transaction/{hash}/process-status", get(process_status))
            .route("/transaction/{hash}", get(get_tx))
            .route("/vm-values/query", post(query))
            .route("/address/{address}/nonce", get(account_nonce))
            .route("/address/{address}/balance", get(account_balance))
            .route("/address/{address}/keys", get(account_keys))
            .route("/address/{address}", get(account))
            .route("/network/status/{shard}", get(network_status))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock gateway");
        let url = format!("http://{}", listener.local_addr().expect("local addr"));
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve mock gateway");
        });
        Self { url, state }
    }

    pub fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state poisoned")
    }
}

fn ok(data: Value) -> Json<Value> {
    Json(json!({"data": data, "error": "", "code": "successful"}))
}

async fn send_tx(State(state): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let mut state = state.lock().expect("mock state poisoned");
    state.sent.push(body);
    match &state.send_envelope {
        Some(envelope) => Json(envelope.clone()),
        None => ok(json!({"txHash": TX_HASH})),
    }
}

async fn process_status(State(state): State<Shared>, Path(hash): Path<String>) -> Json<Value> {
    let mut state = state.lock().expect("mock state poisoned");
    let status = match state.statuses.get_mut(&hash) {
        Some(queue) if queue.len() > 1 => queue.remove(0),
        Some(queue) => queue[0].clone(),
        None => "success".to_owned(),
    };
    ok(json!({"status": status}))
}

async fn get_tx(State(state): State<Shared>, Path(hash): Path<String>) -> Json<Value> {
    let state = state.lock().expect("mock state poisoned");
    let snapshot = state
        .snapshots
        .get(&hash)
        .cloned()
        .unwrap_or_else(|| json!({"status": "success", "gasUsed": 0, "fee": "0"}));
    ok(json!({"transaction": snapshot}))
}

async fn query(State(state): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let mut state = state.lock().expect("mock state poisoned");
    state.queries.push(body);
    let output = state
        .query_output
        .clone()
        .unwrap_or_else(|| json!({"returnCode": "ok", "returnData": []}));
    ok(json!({"data": output}))
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
        .and_then(|a| a.get("pairs").cloned())
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
        fields.remove("pairs");
    }
    ok(json!({"account": account}))
}

async fn network_status(State(state): State<Shared>, Path(_shard): Path<u32>) -> Json<Value> {
    let state = state.lock().expect("mock state poisoned");
    let status = state.network_status.clone().unwrap_or_else(|| {
        json!({
            "erd_block_timestamp": 1700000000u64,
            "erd_cross_check_block_height": "0",
            "erd_current_round": 20,
            "erd_epoch_number": 2,
            "erd_highest_final_nonce": 19,
            "erd_nonce": 20,
            "erd_nonce_at_epoch_start": 10,
            "erd_nonces_passed_in_current_epoch": 10,
            "erd_round_at_epoch_start": 10,
            "erd_rounds_passed_in_current_epoch": 10,
            "erd_rounds_per_epoch": 10,
        })
    });
    ok(json!({"status": status}))
}
