//! Escrow contract bindings

use alloy::primitives::Bytes;
use alloy::sol;
use alloy::sol_types::SolCall;

use escrow_core::RewardBatch;

sol! {
    /// Payout surface of the deployed escrow contract
    #[sol(rpc)]
    interface IEscrow {
        function rewardWinners(address[] calldata winners, uint256[] calldata amounts) external;
    }
}

/// ABI-encoded calldata for `rewardWinners` with the batch's arguments
pub fn encode_reward_call(batch: &RewardBatch) -> Bytes {
    IEscrow::rewardWinnersCall {
        winners: batch.winners().to_vec(),
        amounts: batch.amounts().to_vec(),
    }
    .abi_encode()
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{keccak256, U256};
    use escrow_core::{RewardAmount, RewardRequest};

    fn batch() -> RewardBatch {
        RewardRequest::new(
            ["0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"],
            [RewardAmount::parse("2.5").unwrap()],
        )
        .unwrap()
        .normalize()
        .unwrap()
    }

    #[test]
    fn test_selector_matches_signature() {
        let hash = keccak256("rewardWinners(address[],uint256[])");
        assert_eq!(IEscrow::rewardWinnersCall::SELECTOR, hash[..4]);
    }

    #[test]
    fn test_calldata_carries_scaled_amount() {
        let data = encode_reward_call(&batch());
        assert_eq!(data[..4], IEscrow::rewardWinnersCall::SELECTOR);

        let call = IEscrow::rewardWinnersCall::abi_decode(&data).unwrap();
        assert_eq!(call.winners, batch().winners().to_vec());
        assert_eq!(call.amounts, vec![U256::from(2_500_000_000_000_000_000u128)]);
    }
}
