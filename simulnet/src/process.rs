//! Simulator child-process management: spawn with the configured flags,
//! watch standard output for the ready signal and fail fast on anything the
//! process reports before it is ready.

use std::process::Stdio;

use log::{debug, warn};
use regex::Regex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::time::timeout;

use crate::config::{SimulnetConfig, READY_LINE_PATTERN};
use crate::error::SimulnetError;

/// Spawn the simulator and wait for its ready signal. Returns the owned
/// child and the gateway URL parsed from the signal.
///
/// Stderr output, an exit before the signal, or the startup deadline all
/// abort startup; simulated-network startup failures are environment faults,
/// not transient conditions.
pub(crate) async fn spawn_simulator(
    config: &SimulnetConfig,
) -> Result<(Child, String), SimulnetError> {
    let args = config.to_args();
    debug!("spawning simulator: {} {:?}", config.binary_path.display(), args);
    let mut child = Command::new(&config.binary_path)
        .args(&args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| SimulnetError::Spawn {
            path: config.binary_path.display().to_string(),
            source,
        })?;

    let mut stdout = BufReader::new(child.stdout.take().expect("piped stdout")).lines();
    let mut stderr = BufReader::new(child.stderr.take().expect("piped stderr")).lines();
    let ready = Regex::new(READY_LINE_PATTERN).expect("ready-line pattern is valid");

    let startup = async {
        let mut stderr_open = true;
        loop {
            tokio::select! {
                line = stdout.next_line() => match line? {
                    Some(line) => {
                        debug!("simulator: {}", line);
                        if let Some(captures) = ready.captures(&line) {
                            return Ok(format!("http://{}", &captures[1]));
                        }
                    }
                    None => return Err(SimulnetError::EarlyExit),
                },
                line = stderr.next_line(), if stderr_open => match line? {
                    Some(line) => return Err(SimulnetError::StartupStderr { line }),
                    None => stderr_open = false,
                },
            }
        }
    };

    let url = match timeout(config.startup_timeout, startup).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(SimulnetError::StartupTimeout {
                timeout: config.startup_timeout,
            })
        }
    };

    // keep draining the pipes so the simulator never blocks on them
    tokio::spawn(async move {
        while let Ok(Some(line)) = stdout.next_line().await {
            debug!("simulator: {}", line);
        }
    });
    tokio::spawn(async move {
        while let Ok(Some(line)) = stderr.next_line().await {
            warn!("simulator stderr: {}", line);
        }
    });

    Ok((child, url))
}
