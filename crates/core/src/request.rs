//! Reward requests and their normalized batch form

use alloy::primitives::{Address, U256};

use crate::{normalize_address, CoreError, Result, RewardAmount, REWARD_DECIMALS};

/// Winners and their amounts, as supplied by the caller.
///
/// Element `i` of `winners` receives element `i` of `amounts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardRequest {
    winners: Vec<String>,
    amounts: Vec<RewardAmount>,
}

impl RewardRequest {
    /// Build a request from parallel lists. Lengths must match and be non-zero.
    pub fn new<S: Into<String>>(
        winners: impl IntoIterator<Item = S>,
        amounts: impl IntoIterator<Item = RewardAmount>,
    ) -> Result<Self> {
        let winners: Vec<String> = winners.into_iter().map(Into::into).collect();
        let amounts: Vec<RewardAmount> = amounts.into_iter().collect();

        if winners.len() != amounts.len() {
            return Err(CoreError::LengthMismatch {
                winners: winners.len(),
                amounts: amounts.len(),
            });
        }
        if winners.is_empty() {
            return Err(CoreError::EmptyRequest);
        }

        Ok(Self { winners, amounts })
    }

    /// Build a request from `(winner, amount)` pairs
    pub fn from_pairs<S: Into<String>>(
        pairs: impl IntoIterator<Item = (S, RewardAmount)>,
    ) -> Result<Self> {
        let (winners, amounts): (Vec<String>, Vec<RewardAmount>) = pairs
            .into_iter()
            .map(|(winner, amount)| (winner.into(), amount))
            .unzip();
        Self::new(winners, amounts)
    }

    pub fn winners(&self) -> &[String] {
        &self.winners
    }

    pub fn amounts(&self) -> &[RewardAmount] {
        &self.amounts
    }

    pub fn len(&self) -> usize {
        self.winners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.winners.is_empty()
    }

    /// Scale every amount and checksum every address.
    ///
    /// Fails on the first bad element; no partial batch is ever produced.
    pub fn normalize(&self) -> Result<RewardBatch> {
        let amounts = self
            .amounts
            .iter()
            .map(|amount| amount.to_base_units(REWARD_DECIMALS))
            .collect::<Result<Vec<_>>>()?;

        let winners = self
            .winners
            .iter()
            .map(|winner| normalize_address(winner))
            .collect::<Result<Vec<_>>>()?;

        Ok(RewardBatch { winners, amounts })
    }
}

/// Normalized contract arguments for `rewardWinners(address[],uint256[])`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardBatch {
    winners: Vec<Address>,
    amounts: Vec<U256>,
}

impl RewardBatch {
    pub fn winners(&self) -> &[Address] {
        &self.winners
    }

    /// Amounts in base units
    pub fn amounts(&self) -> &[U256] {
        &self.amounts
    }

    pub fn len(&self) -> usize {
        self.winners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.winners.is_empty()
    }

    /// Sum of all amounts in base units. `None` on overflow.
    pub fn total(&self) -> Option<U256> {
        self.amounts
            .iter()
            .try_fold(U256::ZERO, |acc, amount| acc.checked_add(*amount))
    }

    /// Checksummed winner strings, in order
    pub fn checksummed_winners(&self) -> Vec<String> {
        self.winners.iter().map(|w| w.to_checksum(None)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &U256)> {
        self.winners.iter().zip(self.amounts.iter())
    }
}
