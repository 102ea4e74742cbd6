use std::fmt;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

/// Errors raised by the HTTP-JSON envelope client
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid gateway url: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid gateway configuration: {0}")]
    Config(String),

    /// The gateway answered, but the envelope code was not `successful`.
    /// The full serialized response is kept for diagnostics.
    #[error("unsuccessful gateway request. Response: {response}")]
    Unsuccessful { response: String },

    #[error("malformed gateway response: {reason}")]
    Malformed { reason: String },
}

/// Errors raised by a signing capability
#[derive(Debug, Error)]
pub enum SignerError {
    #[error("signing failed: {0}")]
    Failed(String),
}

/// Which kind of interaction produced an on-chain error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    Transaction,
    Query,
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionKind::Transaction => write!(f, "Transaction"),
            InteractionKind::Query => write!(f, "Query"),
        }
    }
}

/// An on-chain failure: reverted transaction, protocol-level rejection or
/// failed query. All three share one shape so callers can pattern-match on
/// `(kind, code, message)` uniformly; `result` is the raw gateway payload.
#[derive(Debug, Error)]
#[error("{kind} failed: {code} - {message} - Result:\n{}", pretty(.result))]
pub struct InteractionError {
    pub kind: InteractionKind,
    pub code: String,
    pub message: String,
    pub result: Value,
}

impl InteractionError {
    pub fn tx(code: impl Into<String>, message: impl Into<String>, result: Value) -> Self {
        Self {
            kind: InteractionKind::Transaction,
            code: code.into(),
            message: message.into(),
            result,
        }
    }

    pub fn query(code: impl Into<String>, message: impl Into<String>, result: Value) -> Self {
        Self {
            kind: InteractionKind::Query,
            code: code.into(),
            message: message.into(),
            result,
        }
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Umbrella error for the transaction pipeline and queries
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Signer(#[from] SignerError),

    #[error(transparent)]
    Interaction(#[from] InteractionError),

    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The transaction was observed as pending while resolving. Resolving a
    /// pending transaction is forbidden; settle it first with `await_tx`.
    #[error("transaction {hash} is still pending")]
    StillPending { hash: String },

    #[error("timed out after {timeout:?} waiting for transaction {hash}")]
    Timeout { hash: String, timeout: Duration },

    #[error("malformed transaction snapshot for {hash}: {reason}")]
    MalformedTx { hash: String, reason: String },
}
