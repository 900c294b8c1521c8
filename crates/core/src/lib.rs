//! Escrow Rewards Core Types
//!
//! Input normalization for escrow reward payouts. Nothing in this crate
//! touches the network.
//!
//! - [`normalize_address`]: raw string to an EIP-55 checksummed [`Address`]
//! - [`RewardAmount`]: decimal amount scaled to 18-decimal base units
//! - [`RewardRequest`]: parallel winner/amount lists, normalized into a
//!   [`RewardBatch`] ready for the `rewardWinners` contract call

mod address;
mod amount;
mod error;
mod request;

pub use address::{checksummed, normalize_address};
pub use amount::{format_base_units, RewardAmount, REWARD_DECIMALS};
pub use error::*;
pub use request::{RewardBatch, RewardRequest};

pub use alloy::primitives::{Address, U256};
