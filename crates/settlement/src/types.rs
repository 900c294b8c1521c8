//! Settlement types for reward submissions

use alloy::primitives::{Address, Bytes, TxHash, U256};
use serde::Serialize;

/// Confirmation record of a mined reward transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewardReceipt {
    /// Hash of the mined transaction
    pub tx_hash: TxHash,
    /// Block that included the transaction
    pub block_number: Option<u64>,
    /// Gas consumed by the call
    pub gas_used: u64,
    /// Execution status (false = reverted)
    pub success: bool,
}

/// Successful outcome of `reward_winners`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewardOutcome {
    /// Handle returned when the node accepted the transaction
    pub tx_hash: TxHash,
    /// Receipt after confirmation
    pub receipt: RewardReceipt,
    /// Number of winners paid
    pub winners: usize,
    /// Sum of all amounts in base units
    pub total: U256,
}

/// A submission recorded by the mock client instead of being broadcast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockSubmission {
    pub tx_hash: TxHash,
    /// Account nonce the transaction was assigned
    pub nonce: u64,
    pub winners: Vec<Address>,
    pub amounts: Vec<U256>,
    /// Exact calldata that would have been sent
    pub calldata: Bytes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serializes_hash_as_hex() {
        let tx_hash = TxHash::repeat_byte(0xab);
        let outcome = RewardOutcome {
            tx_hash,
            receipt: RewardReceipt {
                tx_hash,
                block_number: Some(7),
                gas_used: 52_000,
                success: true,
            },
            winners: 1,
            total: U256::from(1u64),
        };

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["tx_hash"], format!("0x{}", "ab".repeat(32)));
        assert_eq!(json["receipt"]["block_number"], 7);
        assert_eq!(json["receipt"]["success"], true);
    }
}
