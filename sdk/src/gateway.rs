use std::time::Duration;

use log::{debug, trace};
use primitive_types::U256;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::config::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT};
use crate::data::{base64_to_hex, Address, Kvs};
use crate::error::{ClientError, GatewayError, InteractionError};

/// Configuration for the gateway client
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base of the explorer links composed into resolved results
    pub explorer_url: String,
    /// Extra headers attached to every request
    pub headers: Vec<(String, String)>,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            explorer_url: String::new(),
            headers: Vec::new(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// Stateless HTTP-JSON client for a gateway node.
///
/// Every response is wrapped in a `{data, code, error}` envelope; `fetch`
/// enforces `code == "successful"` and unwraps `data`, `fetch_raw` returns
/// the body verbatim for workflows with custom envelopes. Cloning is cheap
/// and clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Gateway {
    client: Client,
    base_url: String,
    explorer_url: String,
}

impl Gateway {
    pub fn new(url: &str) -> Result<Self, GatewayError> {
        Self::with_config(url, GatewayConfig::default())
    }

    pub fn with_config(url: &str, config: GatewayConfig) -> Result<Self, GatewayError> {
        let base_url = if url.starts_with("http://") || url.starts_with("https://") {
            Url::parse(url)?
        } else {
            Url::parse(&format!("http://{}", url))?
        };

        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| GatewayError::Config(format!("invalid header name: {}", name)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| GatewayError::Config(format!("invalid header value for {}", name)))?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_owned(),
            explorer_url: config.explorer_url,
        })
    }

    pub fn url(&self) -> &str {
        &self.base_url
    }

    pub fn explorer_url(&self) -> &str {
        &self.explorer_url
    }

    /// Perform a request and parse the body as JSON, without looking at the
    /// envelope. GET without a body, POST with a JSON body otherwise.
    pub async fn fetch_raw(&self, path: &str, body: Option<&Value>) -> Result<Value, GatewayError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("fetch {} (body: {})", url, body.is_some());
        let request = match body {
            None => self.client.get(&url),
            Some(body) => self.client.post(&url).json(body),
        };
        let response = request.send().await?;
        Ok(response.json::<Value>().await?)
    }

    /// Perform a request and unwrap the `{data, code, error}` envelope.
    /// Any envelope code other than `successful` fails with the full
    /// serialized response kept for diagnostics.
    pub async fn fetch(&self, path: &str, body: Option<&Value>) -> Result<Value, GatewayError> {
        let response = self.fetch_raw(path, body).await?;
        if response.get("code").and_then(Value::as_str) == Some("successful") {
            Ok(response.get("data").cloned().unwrap_or(Value::Null))
        } else {
            let response = serde_json::to_string_pretty(&response)
                .unwrap_or_else(|_| response.to_string());
            Err(GatewayError::Unsuccessful { response })
        }
    }

    // ========== Account reads ==========

    pub async fn get_account_nonce(
        &self,
        address: &Address,
        shard: Option<u32>,
    ) -> Result<u64, GatewayError> {
        trace!("get_account_nonce");
        let data = self
            .fetch(&account_path(address, "/nonce", shard), None)
            .await?;
        data.get("nonce")
            .and_then(Value::as_u64)
            .ok_or_else(|| malformed("missing account nonce"))
    }

    pub async fn get_account_balance(
        &self,
        address: &Address,
        shard: Option<u32>,
    ) -> Result<U256, GatewayError> {
        trace!("get_account_balance");
        let data = self
            .fetch(&account_path(address, "/balance", shard), None)
            .await?;
        let balance = data
            .get("balance")
            .ok_or_else(|| malformed("missing account balance"))?;
        uint_from_value(balance, "account balance")
    }

    pub async fn get_account_kvs(
        &self,
        address: &Address,
        shard: Option<u32>,
    ) -> Result<Kvs, GatewayError> {
        trace!("get_account_kvs");
        let data = self
            .fetch(&account_path(address, "/keys", shard), None)
            .await?;
        match data.get("pairs") {
            None | Some(Value::Null) => Ok(Kvs::new()),
            Some(pairs) => serde_json::from_value(pairs.clone())
                .map_err(|_| malformed("unparseable storage pairs")),
        }
    }

    /// Account snapshot without its key-value storage
    pub async fn get_account_without_kvs(
        &self,
        address: &Address,
        shard: Option<u32>,
    ) -> Result<AccountSnapshot, GatewayError> {
        trace!("get_account_without_kvs");
        let data = self.fetch(&account_path(address, "", shard), None).await?;
        let account = data
            .get("account")
            .ok_or_else(|| malformed("missing account"))?;
        account_from_value(account)
    }

    /// Full account snapshot, storage included
    pub async fn get_account(
        &self,
        address: &Address,
        shard: Option<u32>,
    ) -> Result<AccountSnapshot, GatewayError> {
        trace!("get_account");
        let (account, kvs) = tokio::join!(
            self.get_account_without_kvs(address, shard),
            self.get_account_kvs(address, shard),
        );
        let mut account = account?;
        account.kvs = kvs?;
        Ok(account)
    }

    // ========== Network reads ==========

    pub async fn get_network_status(&self, shard: u32) -> Result<NetworkStatus, GatewayError> {
        trace!("get_network_status");
        let data = self
            .fetch(&format!("/network/status/{}", shard), None)
            .await?;
        let status = data
            .get("status")
            .ok_or_else(|| malformed("missing network status"))?;
        serde_json::from_value(status.clone()).map_err(|_| malformed("unparseable network status"))
    }

    // ========== Read-only contract calls ==========

    /// Execute a read-only contract call. A non-ok/non-zero return code is a
    /// Query interaction error carrying the full VM output.
    pub async fn query(&self, query: &Query) -> Result<QueryResult, ClientError> {
        trace!("query: {}", query.func_name);
        let raw = RawQuery::from(query);
        let data = self
            .fetch("/vm-values/query", Some(&serde_json::to_value(&raw)?))
            .await?;
        let vm_output = data
            .get("data")
            .cloned()
            .ok_or_else(|| malformed("missing vm output"))?;

        let return_code = vm_output.get("returnCode");
        let ok = matches!(return_code, Some(Value::String(s)) if s == "ok")
            || matches!(return_code, Some(Value::Number(n)) if n.as_u64() == Some(0));
        if !ok {
            let code = return_code.map(code_string).unwrap_or_default();
            let message = vm_output
                .get("returnMessage")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned();
            return Err(InteractionError::query(code, message, vm_output.clone()).into());
        }

        let mut return_data = Vec::new();
        if let Some(entries) = vm_output.get("returnData").and_then(Value::as_array) {
            for entry in entries {
                let encoded = entry
                    .as_str()
                    .ok_or_else(|| malformed("non-string query return data"))?;
                return_data
                    .push(base64_to_hex(encoded).map_err(|_| malformed("undecodable query return data"))?);
            }
        }
        Ok(QueryResult {
            return_data,
            query: vm_output,
        })
    }
}

/// Settled view of an account as reported by the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSnapshot {
    pub address: Address,
    pub nonce: u64,
    pub balance: U256,
    /// Contract code, hex encoded; empty for plain wallets
    pub code: String,
    pub code_hash: String,
    pub code_metadata: String,
    /// Owner address in bech32 form; empty when not a contract
    pub owner: String,
    pub kvs: Kvs,
}

/// Network/epoch/round metadata of one shard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkStatus {
    #[serde(rename = "erd_block_timestamp")]
    pub block_timestamp: u64,
    #[serde(rename = "erd_cross_check_block_height")]
    pub cross_check_block_height: String,
    #[serde(rename = "erd_current_round")]
    pub round: u64,
    #[serde(rename = "erd_epoch_number")]
    pub epoch: u64,
    #[serde(rename = "erd_highest_final_nonce")]
    pub highest_final_nonce: u64,
    #[serde(rename = "erd_nonce")]
    pub nonce: u64,
    #[serde(rename = "erd_nonce_at_epoch_start")]
    pub nonce_at_epoch_start: u64,
    #[serde(rename = "erd_nonces_passed_in_current_epoch")]
    pub nonces_passed_in_current_epoch: u64,
    #[serde(rename = "erd_round_at_epoch_start")]
    pub round_at_epoch_start: u64,
    #[serde(rename = "erd_rounds_passed_in_current_epoch")]
    pub rounds_passed_in_current_epoch: u64,
    #[serde(rename = "erd_rounds_per_epoch")]
    pub rounds_per_epoch: u64,
}

/// A read-only contract call
#[derive(Debug, Clone)]
pub struct Query {
    pub callee: Address,
    pub func_name: String,
    /// Already top-encoded hex arguments
    pub func_args: Vec<String>,
    pub caller: Option<Address>,
    pub value: Option<U256>,
}

#[derive(Debug, Clone)]
pub struct QueryResult {
    /// Top-encoded hex return values
    pub return_data: Vec<String>,
    /// Full VM output for callers needing more than the return data
    pub query: Value,
}

#[derive(Serialize)]
struct RawQuery {
    #[serde(rename = "scAddress")]
    sc_address: String,
    #[serde(rename = "funcName")]
    func_name: String,
    args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    caller: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
}

impl From<&Query> for RawQuery {
    fn from(query: &Query) -> Self {
        Self {
            sc_address: query.callee.to_bech32(),
            func_name: query.func_name.clone(),
            args: query.func_args.clone(),
            caller: query.caller.as_ref().map(Address::to_bech32),
            value: query.value.as_ref().map(U256::to_string),
        }
    }
}

fn account_path(address: &Address, resource: &str, shard: Option<u32>) -> String {
    let mut path = format!("/address/{}{}", address.to_bech32(), resource);
    if let Some(shard) = shard {
        path.push_str(&format!("?forced-shard-id={}", shard));
    }
    path
}

fn account_from_value(account: &Value) -> Result<AccountSnapshot, GatewayError> {
    let address = account
        .get("address")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("missing account address"))?;
    let address =
        Address::from_bech32(address).map_err(|_| malformed("invalid account address"))?;
    let balance = account
        .get("balance")
        .ok_or_else(|| malformed("missing account balance"))?;
    let text = |field: &str| {
        account
            .get(field)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned()
    };
    Ok(AccountSnapshot {
        address,
        nonce: account.get("nonce").and_then(Value::as_u64).unwrap_or(0),
        balance: uint_from_value(balance, "account balance")?,
        code: text("code"),
        code_hash: base64_to_hex(&text("codeHash"))
            .map_err(|_| malformed("undecodable code hash"))?,
        code_metadata: base64_to_hex(&text("codeMetadata"))
            .map_err(|_| malformed("undecodable code metadata"))?,
        owner: text("ownerAddress"),
        kvs: Kvs::new(),
    })
}

pub(crate) fn malformed(reason: &str) -> GatewayError {
    GatewayError::Malformed {
        reason: reason.to_owned(),
    }
}

// Gateways report integers as decimal strings in some places and JSON
// numbers in others; accept both.
pub(crate) fn uint_from_value(value: &Value, what: &str) -> Result<U256, GatewayError> {
    match value {
        Value::String(s) => {
            U256::from_dec_str(s).map_err(|_| malformed(&format!("unparseable {}", what)))
        }
        Value::Number(n) => n
            .as_u64()
            .map(U256::from)
            .ok_or_else(|| malformed(&format!("unparseable {}", what))),
        _ => Err(malformed(&format!("unparseable {}", what))),
    }
}

pub(crate) fn code_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
