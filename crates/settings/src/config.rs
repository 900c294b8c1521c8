//! Configuration types

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::http::reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::info;

use escrow_core::normalize_address;
use escrow_settlement::{SettlementClient, SettlementConfig, SettlementMode};

use crate::{
    Result, SettingsError, ENV_CONFIRMATIONS, ENV_CONFIRM_TIMEOUT_SECS, ENV_CONTRACT_ADDRESS,
    ENV_PRIVATE_KEY, ENV_PROVIDER_URL,
};

/// File-backed settings, before environment overrides and validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Submit for real or record in memory
    #[serde(default)]
    pub mode: SettingsMode,

    /// JSON-RPC endpoint
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Deployed escrow contract
    #[serde(default)]
    pub contract_address: Option<String>,

    /// Confirmations to wait for
    #[serde(default = "default_confirmations")]
    pub confirmations: u64,

    /// Confirmation timeout in seconds (unset = wait forever)
    #[serde(default)]
    pub confirm_timeout_secs: Option<u64>,

    /// Custom settings file path (not serialized)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

fn default_rpc_url() -> String {
    SettlementConfig::DEFAULT_RPC_URL.to_string()
}

fn default_confirmations() -> u64 {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: SettingsMode::default(),
            rpc_url: default_rpc_url(),
            contract_address: None,
            confirmations: default_confirmations(),
            confirm_timeout_secs: None,
            config_path: None,
        }
    }
}

/// Submission mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SettingsMode {
    /// Broadcast to the configured endpoint
    #[default]
    Live,
    /// Record submissions in memory only
    Mock,
}

impl From<SettingsMode> for SettlementMode {
    fn from(mode: SettingsMode) -> Self {
        match mode {
            SettingsMode::Live => SettlementMode::Live,
            SettingsMode::Mock => SettlementMode::Mock,
        }
    }
}

impl Settings {
    /// Load settings from a specific path, or create defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).map_err(SettingsError::ReadError)?;
            let mut settings: Settings =
                serde_json::from_str(&content).map_err(SettingsError::ParseError)?;
            settings.config_path = Some(path.to_path_buf());
            info!("Loaded settings from {:?}", path);
            Ok(settings)
        } else {
            let mut settings = Self::default();
            settings.config_path = Some(path.to_path_buf());
            Ok(settings)
        }
    }

    /// Save settings to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(SettingsError::CreateDirError)?;
            }
        }

        let content = serde_json::to_string_pretty(self).map_err(SettingsError::ParseError)?;
        std::fs::write(path, content).map_err(SettingsError::WriteError)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }

    /// Path these settings were loaded from, if any
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Apply the process environment, backed by the dotenv file at
    /// `dotenv_path`, and validate
    pub fn resolve_from_env(self, dotenv_path: &Path) -> Result<ResolvedSettings> {
        self.resolve_with_dotenv(dotenv_path, |name| std::env::var(name).ok())
    }

    /// Like [`resolve`](Self::resolve), with variables missing from `env`
    /// looked up in a dotenv file. A missing file is not an error.
    pub fn resolve_with_dotenv<F>(self, dotenv_path: &Path, env: F) -> Result<ResolvedSettings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file_vars = read_dotenv(dotenv_path)?;
        self.resolve(|name| env(name).or_else(|| file_vars.get(name).cloned()))
    }

    /// Apply environment overrides from `env` and validate everything.
    ///
    /// Empty variables count as unset. The private key is checked first, so
    /// a missing key is reported before anything else.
    pub fn resolve<F>(mut self, env: F) -> Result<ResolvedSettings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| env(name).filter(|value| !value.trim().is_empty());

        let private_key = var(ENV_PRIVATE_KEY).ok_or(SettingsError::MissingVar(ENV_PRIVATE_KEY))?;
        let signer: PrivateKeySigner = private_key
            .trim()
            .parse()
            .map_err(|_| SettingsError::InvalidPrivateKey(ENV_PRIVATE_KEY))?;

        if let Some(url) = var(ENV_PROVIDER_URL) {
            self.rpc_url = url;
        }
        if let Some(address) = var(ENV_CONTRACT_ADDRESS) {
            self.contract_address = Some(address);
        }
        if let Some(value) = var(ENV_CONFIRMATIONS) {
            self.confirmations = parse_number(ENV_CONFIRMATIONS, &value)?;
        }
        if let Some(value) = var(ENV_CONFIRM_TIMEOUT_SECS) {
            self.confirm_timeout_secs = Some(parse_number(ENV_CONFIRM_TIMEOUT_SECS, &value)?);
        }

        self.rpc_url
            .parse::<Url>()
            .map_err(|e| SettingsError::InvalidRpcUrl(format!("{}: {}", self.rpc_url, e)))?;

        if self.confirmations == 0 {
            return Err(SettingsError::InvalidNumber {
                name: "confirmations",
                value: "0".to_string(),
            });
        }

        let contract_address = self
            .contract_address
            .as_deref()
            .map(normalize_address)
            .transpose()
            .map_err(SettingsError::InvalidContractAddress)?;

        if self.mode == SettingsMode::Live && contract_address.is_none() {
            return Err(SettingsError::MissingContractAddress);
        }

        let settlement = SettlementConfig {
            mode: self.mode.into(),
            rpc_url: self.rpc_url,
            contract_address,
            confirmations: self.confirmations,
            confirm_timeout: self.confirm_timeout_secs.map(Duration::from_secs),
        };

        info!(
            "Resolved settings: mode {:?}, rpc {}, contract {:?}, signer {}",
            settlement.mode,
            settlement.rpc_url,
            settlement.contract_address,
            signer.address(),
        );

        Ok(ResolvedSettings { settlement, signer })
    }
}

fn read_dotenv(path: &Path) -> Result<HashMap<String, String>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }

    let vars = dotenvy::from_path_iter(path)
        .map_err(SettingsError::DotenvError)?
        .collect::<std::result::Result<HashMap<_, _>, _>>()
        .map_err(SettingsError::DotenvError)?;
    info!("Loaded {} variables from {:?}", vars.len(), path);
    Ok(vars)
}

fn parse_number(name: &'static str, value: &str) -> Result<u64> {
    value.trim().parse().map_err(|_| SettingsError::InvalidNumber {
        name,
        value: value.to_string(),
    })
}

/// Validated configuration, ready to build a client from
#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    pub settlement: SettlementConfig,
    signer: PrivateKeySigner,
}

impl ResolvedSettings {
    pub fn signer_address(&self) -> Address {
        self.signer.address()
    }

    /// Build the settlement client. Live mode connects lazily; no request is
    /// made here.
    pub fn into_client(self) -> escrow_settlement::Result<SettlementClient> {
        SettlementClient::with_signer(self.settlement, self.signer)
    }
}
