//! Escrow Rewards Settlement
//!
//! Client for paying out winners through a deployed escrow contract.
//!
//! ## Reward Flow
//!
//! 1. **Normalize**: winner addresses are checksummed and amounts scaled to
//!    18-decimal base units. A single bad element rejects the whole request
//!    before anything touches the network.
//! 2. **Submit**: one transaction calls
//!    `rewardWinners(address[],uint256[])` on the escrow contract. The
//!    transaction hash is returned as soon as the node accepts it.
//! 3. **Confirm**: the client waits for the configured number of
//!    confirmations and turns the receipt into a [`RewardOutcome`]. A
//!    reverted transaction is an error.

mod client;
mod contract;
mod types;

pub use client::{SettlementClient, SettlementConfig, SettlementMode};
pub use contract::{encode_reward_call, IEscrow};
pub use types::*;

use alloy::primitives::TxHash;
use escrow_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettlementError {
    #[error("Invalid reward request: {0}")]
    Invalid(#[from] CoreError),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Transaction reverted: {0}")]
    Reverted(TxHash),

    #[error("Timed out waiting for confirmation of {0}")]
    ConfirmationTimeout(TxHash),

    #[error("Escrow contract address not configured")]
    MissingContract,

    #[error("Invalid private key")]
    InvalidPrivateKey,

    #[error("Not authorized: no signer configured")]
    NotAuthorized,
}

impl SettlementError {
    /// Permanent errors caused by the request itself. Retrying won't help.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }
}

pub type Result<T> = std::result::Result<T, SettlementError>;
