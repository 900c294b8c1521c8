//! Reward flow integration tests
//!
//! Drives the whole path a caller takes:
//! 1. Settings resolved from a file plus environment
//! 2. Client built from the resolved settings
//! 3. Winners normalized and submitted (mock mode)
//! 4. Failures reported as typed errors with nothing submitted

use std::collections::HashMap;
use std::sync::Arc;

use alloy::primitives::U256;
use alloy::sol_types::SolCall;

use escrow_core::{format_base_units, CoreError, RewardAmount, REWARD_DECIMALS};
use escrow_settings::{Settings, SettingsError, SettingsMode, ENV_PRIVATE_KEY};
use escrow_settlement::{IEscrow, SettlementClient, SettlementError};

const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const ALICE: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
const BOB: &str = "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB";
const CAROL: &str = "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb";

fn mock_client() -> SettlementClient {
    let env: HashMap<&str, &str> = [(ENV_PRIVATE_KEY, DEV_KEY)].into_iter().collect();
    let settings = Settings {
        mode: SettingsMode::Mock,
        ..Default::default()
    };
    settings
        .resolve(|name| env.get(name).map(|v| v.to_string()))
        .unwrap()
        .into_client()
        .unwrap()
}

fn amounts(values: &[f64]) -> Vec<RewardAmount> {
    values
        .iter()
        .map(|v| RewardAmount::from_f64(*v).unwrap())
        .collect()
}

// ============================================================================
// 1. Successful payout
// ============================================================================

#[tokio::test]
async fn test_single_winner_scaled_and_checksummed() {
    let client = mock_client();

    let outcome = client
        .reward_winners(&[ALICE.to_lowercase()], &amounts(&[2.5]))
        .await
        .unwrap();

    let submissions = client.mock_submissions();
    assert_eq!(submissions.len(), 1);

    let call = IEscrow::rewardWinnersCall::abi_decode(&submissions[0].calldata).unwrap();
    assert_eq!(call.winners[0].to_checksum(None), ALICE);
    assert_eq!(call.amounts[0], U256::from(2_500_000_000_000_000_000u128));
    assert_eq!(outcome.total, call.amounts[0]);
}

#[tokio::test]
async fn test_multiple_winners_in_one_transaction() {
    let client = mock_client();

    let outcome = client
        .reward_winners(&[ALICE, BOB, CAROL], &amounts(&[1.0, 0.25, 100.0]))
        .await
        .unwrap();

    assert_eq!(outcome.winners, 3);
    assert_eq!(format_base_units(outcome.total, REWARD_DECIMALS), "101.25");

    let submissions = client.mock_submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(
        submissions[0]
            .winners
            .iter()
            .map(|w| w.to_checksum(None))
            .collect::<Vec<_>>(),
        vec![ALICE, BOB, CAROL]
    );
}

#[tokio::test]
async fn test_outcome_json() {
    let client = mock_client();
    let outcome = client
        .reward_winners(&[BOB], &amounts(&[3.0]))
        .await
        .unwrap();

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["winners"], 1);
    assert_eq!(json["receipt"]["success"], true);
    assert!(json["tx_hash"].as_str().unwrap().starts_with("0x"));
}

// ============================================================================
// 2. Rejected requests
// ============================================================================

#[tokio::test]
async fn test_malformed_address_blocks_submission() {
    let client = mock_client();

    let err = client
        .reward_winners(&[ALICE, "not-an-address"], &amounts(&[1.0, 2.0]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SettlementError::Invalid(CoreError::InvalidAddress(ref raw)) if raw == "not-an-address"
    ));
    assert!(client.mock_submissions().is_empty());
}

#[tokio::test]
async fn test_length_mismatch_blocks_submission() {
    let client = mock_client();

    let err = client
        .reward_winners(&[ALICE], &amounts(&[1.0, 2.0]))
        .await
        .unwrap_err();

    assert!(err.is_input_error());
    assert!(matches!(
        err,
        SettlementError::Invalid(CoreError::LengthMismatch { winners: 1, amounts: 2 })
    ));
    assert!(client.mock_submissions().is_empty());
}

#[tokio::test]
async fn test_network_failure_is_returned_not_swallowed() {
    let client = mock_client();
    client.fail_next_submission("connection refused");

    let err = client
        .reward_winners(&[ALICE], &amounts(&[1.0]))
        .await
        .unwrap_err();

    assert!(!err.is_input_error());
    assert!(err.to_string().contains("connection refused"));
}

// ============================================================================
// 3. Startup configuration
// ============================================================================

#[test]
fn test_missing_private_key_fails_before_client_exists() {
    let err = Settings {
        mode: SettingsMode::Mock,
        ..Default::default()
    }
    .resolve(|_| None)
    .unwrap_err();

    assert!(matches!(err, SettingsError::MissingVar(ENV_PRIVATE_KEY)));
}

#[test]
fn test_settings_file_round_trip_into_client() {
    let dir = std::env::temp_dir().join("escrow-rewards-test-flow");
    let path = dir.join("escrow.json");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        &path,
        format!(r#"{{"mode":"mock","contract_address":"{}","confirmations":2}}"#, CAROL),
    )
    .unwrap();

    let resolved = Settings::load_from(&path)
        .unwrap()
        .resolve(|name| (name == ENV_PRIVATE_KEY).then(|| DEV_KEY.to_string()))
        .unwrap();

    assert_eq!(resolved.settlement.confirmations, 2);
    assert_eq!(
        resolved.settlement.contract_address.unwrap().to_checksum(None),
        CAROL
    );
    assert!(resolved.into_client().unwrap().is_mock());

    let _ = std::fs::remove_dir_all(&dir);
}

// ============================================================================
// 4. Concurrency
// ============================================================================

#[tokio::test]
async fn test_concurrent_rewards_get_distinct_handles() {
    let client = Arc::new(mock_client());

    let tasks: Vec<_> = [ALICE, BOB, CAROL]
        .into_iter()
        .map(|winner| {
            let client = client.clone();
            tokio::spawn(async move {
                client
                    .reward_winners(&[winner], &[RewardAmount::from(1)])
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut hashes = Vec::new();
    for task in tasks {
        hashes.push(task.await.unwrap().tx_hash);
    }
    hashes.sort();
    hashes.dedup();
    assert_eq!(hashes.len(), 3);
    assert_eq!(client.mock_submissions().len(), 3);
}
