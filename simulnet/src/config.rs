use std::path::{Path, PathBuf};
use std::time::Duration;

use mvx_sdk::config::DEFAULT_GAS_PRICE;

/// Chain id of a locally-simulated network
pub const SIMULNET_CHAIN_ID: &str = "chain";

/// How long the controller waits for the ready signal before giving up
pub const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(60);

// Line printed by the simulator once its HTTP server is bound
pub(crate) const READY_LINE_PATTERN: &str =
    r"chain simulator's is accessible through the URL ([\w\d.:]+)";

/// Launch configuration for a simulator process.
///
/// `new` derives the conventional layout below a configs directory; every
/// path can be overridden afterwards.
#[derive(Debug, Clone)]
pub struct SimulnetConfig {
    pub binary_path: PathBuf,
    /// Port for the simulator's HTTP server; 0 lets the simulator pick one
    pub port: u16,
    pub config_path: PathBuf,
    pub proxy_configs_path: PathBuf,
    pub node_configs_path: PathBuf,
    /// Layered node override configs, applied in order; later entries take
    /// precedence for overlapping keys
    pub node_override_config_paths: Vec<PathBuf>,
    pub download_configs: bool,
    pub gas_price: u64,
    pub explorer_url: String,
    pub startup_timeout: Duration,
}

impl SimulnetConfig {
    pub fn new(binary_path: impl Into<PathBuf>, configs_path: impl AsRef<Path>) -> Self {
        let configs = configs_path.as_ref();
        Self {
            binary_path: binary_path.into(),
            port: 0,
            config_path: configs.join("config.toml"),
            proxy_configs_path: configs.join("proxy/config"),
            node_configs_path: configs.join("node/config"),
            node_override_config_paths: vec![
                configs.join("nodeOverrideDefault.toml"),
                configs.join("nodeOverride.toml"),
            ],
            download_configs: false,
            gas_price: DEFAULT_GAS_PRICE,
            explorer_url: String::new(),
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
        }
    }

    /// Append a user override config on top of the built-in layers
    pub fn with_override_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.node_override_config_paths.push(path.into());
        self
    }

    pub(crate) fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "--server-port".to_owned(),
            self.port.to_string(),
            "--config".to_owned(),
            self.config_path.display().to_string(),
            "--proxy-configs".to_owned(),
            self.proxy_configs_path.display().to_string(),
            "--node-configs".to_owned(),
            self.node_configs_path.display().to_string(),
        ];
        if !self.node_override_config_paths.is_empty() {
            let joined = self
                .node_override_config_paths
                .iter()
                .map(|path| path.display().to_string())
                .collect::<Vec<_>>()
                .join(",");
            args.push("--node-override-config".to_owned());
            args.push(joined);
        }
        if !self.download_configs {
            args.push("--skip-configs-download".to_owned());
        }
        args
    }
}
