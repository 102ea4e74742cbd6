use std::time::Duration;

use thiserror::Error;

use mvx_sdk::{ClientError, GatewayError};

#[derive(Debug, Error)]
pub enum SimulnetError {
    #[error("failed to spawn simulator binary {path}: {source}")]
    Spawn {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Startup failures are environment faults, never retried
    #[error("simulator wrote to stderr during startup: {line}")]
    StartupStderr { line: String },

    #[error("simulator exited before the ready signal")]
    EarlyExit,

    #[error("simulator did not become ready within {timeout:?}")]
    StartupTimeout { timeout: Duration },

    #[error("i/o error on simulator process: {0}")]
    Io(#[from] std::io::Error),

    #[error("simulator process is not running")]
    NotRunning,

    #[error("failed to expand code reference {path}: {source}")]
    CodeExpansion {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Client(#[from] ClientError),
}
