//! Escrow Rewards Settings
//!
//! Configuration for the reward submitter, built once and validated up
//! front. Nothing is read lazily at call time.
//!
//! ## Sources
//!
//! - JSON settings file (optional): endpoint, contract, confirmation policy
//! - Dotenv file (optional, usually `.env`), consulted for variables the
//!   process environment does not set
//! - Environment, which overrides the file:
//!   - `PRIVATE_KEY` (required, never read from the file)
//!   - `PROVIDER_URL`
//!   - `ESCROW_CONTRACT_ADDRESS`
//!   - `ESCROW_CONFIRMATIONS`
//!   - `ESCROW_CONFIRM_TIMEOUT_SECS`
//!
//! ## Usage
//!
//! ```no_run
//! use escrow_settings::Settings;
//!
//! let settings = Settings::load_from("escrow.json".as_ref())?;
//! let resolved = settings.resolve_from_env(".env".as_ref())?;
//! let client = resolved.into_client()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;

pub use config::{ResolvedSettings, Settings, SettingsMode};

use escrow_core::CoreError;
use thiserror::Error;

/// Environment variable holding the signing key
pub const ENV_PRIVATE_KEY: &str = "PRIVATE_KEY";
/// Environment variable overriding the RPC endpoint
pub const ENV_PROVIDER_URL: &str = "PROVIDER_URL";
/// Environment variable overriding the escrow contract address
pub const ENV_CONTRACT_ADDRESS: &str = "ESCROW_CONTRACT_ADDRESS";
/// Environment variable overriding the required confirmations
pub const ENV_CONFIRMATIONS: &str = "ESCROW_CONFIRMATIONS";
/// Environment variable overriding the confirmation timeout
pub const ENV_CONFIRM_TIMEOUT_SECS: &str = "ESCROW_CONFIRM_TIMEOUT_SECS";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings: {0}")]
    ReadError(std::io::Error),

    #[error("Failed to write settings: {0}")]
    WriteError(std::io::Error),

    #[error("Failed to parse settings: {0}")]
    ParseError(serde_json::Error),

    #[error("Failed to create config directory: {0}")]
    CreateDirError(std::io::Error),

    #[error("Failed to read dotenv file: {0}")]
    DotenvError(dotenvy::Error),

    #[error("{0} is not defined in the environment variables")]
    MissingVar(&'static str),

    #[error("{0} is not a valid private key")]
    InvalidPrivateKey(&'static str),

    #[error("Invalid escrow contract address: {0}")]
    InvalidContractAddress(CoreError),

    #[error("Escrow contract address is required in live mode (set {ENV_CONTRACT_ADDRESS} or contract_address)")]
    MissingContractAddress,

    #[error("Invalid value for {name}: {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),
}

pub type Result<T> = std::result::Result<T, SettingsError>;
