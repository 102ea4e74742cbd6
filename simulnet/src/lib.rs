pub mod account;
pub mod config;
pub mod error;
pub mod world;

mod process;

pub use account::{AccountFixture, SettableAccount};
pub use config::{SimulnetConfig, SIMULNET_CHAIN_ID};
pub use error::SimulnetError;
pub use world::{SimCall, SimContract, SimDeploy, SimTransfer, SimUpgrade, SimWallet, Simulnet};
