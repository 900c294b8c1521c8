//! Settlement client for paying out escrow rewards
//!
//! Supports two modes:
//! - **Mock Mode**: For development/testing without a chain. Submissions are
//!   recorded in memory and get deterministic transaction hashes.
//! - **Live Mode**: Signed transactions sent over JSON-RPC to the deployed
//!   escrow contract.
//!
//! Submissions through one client are serialized until the node has accepted
//! the transaction, so two concurrent calls never race for the same nonce.
//! Confirmation waits run concurrently.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use alloy::network::{EthereumWallet, ReceiptResponse};
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{
    DynProvider, PendingTransactionError, Provider, ProviderBuilder, WatchTxError,
};
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::http::reqwest::Url;
use alloy::transports::RpcError;

use escrow_core::{format_base_units, RewardAmount, RewardBatch, RewardRequest, REWARD_DECIMALS};

use crate::contract::{encode_reward_call, IEscrow};
use crate::{MockSubmission, Result, RewardOutcome, RewardReceipt, SettlementError};

/// Settlement mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementMode {
    /// Mock mode for development - submissions are recorded in memory
    Mock,
    /// Live mode (requires a deployed escrow contract)
    Live,
}

/// Settlement client configuration
#[derive(Debug, Clone)]
pub struct SettlementConfig {
    /// Settlement mode (Mock or Live)
    pub mode: SettlementMode,
    /// JSON-RPC endpoint (only used in Live mode)
    pub rpc_url: String,
    /// Deployed escrow contract
    pub contract_address: Option<Address>,
    /// Blocks to wait for before a transaction counts as confirmed
    pub confirmations: u64,
    /// Give up waiting for confirmation after this long (None = wait forever)
    pub confirm_timeout: Option<Duration>,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            mode: SettlementMode::Mock,
            rpc_url: Self::DEFAULT_RPC_URL.to_string(),
            contract_address: None,
            confirmations: 1,
            confirm_timeout: None,
        }
    }
}

impl SettlementConfig {
    /// Endpoint used when none is configured
    pub const DEFAULT_RPC_URL: &'static str = "https://your.ethereum.node";

    /// Create a mock configuration for development
    pub fn mock() -> Self {
        Self {
            mode: SettlementMode::Mock,
            ..Default::default()
        }
    }

    /// Create a live configuration against the given endpoint and contract
    pub fn live(rpc_url: impl Into<String>, contract_address: Address) -> Self {
        Self {
            mode: SettlementMode::Live,
            rpc_url: rpc_url.into(),
            contract_address: Some(contract_address),
            ..Default::default()
        }
    }
}

/// In-memory state for mock mode
#[derive(Debug, Default)]
struct MockState {
    /// Every submission, in order
    submissions: Vec<MockSubmission>,
    /// Reason to fail the next submission with, if set
    pending_failure: Option<String>,
    /// Next account nonce; also the number of accepted transactions, which
    /// doubles as the mock block number
    tx_counter: u64,
}

/// Settlement client for escrow reward payouts
///
/// In mock mode nothing is broadcast; the batch that would have been sent is
/// recorded and can be inspected with [`SettlementClient::mock_submissions`].
pub struct SettlementClient {
    config: SettlementConfig,
    /// Address that signs and pays for transactions
    signer_address: Address,
    /// Wallet-backed provider (only used in Live mode)
    provider: Option<DynProvider>,
    /// Held from nonce assignment until the node accepts the transaction
    submit_lock: Mutex<()>,
    /// Mock state (only used in Mock mode)
    mock_state: Arc<RwLock<MockState>>,
}

impl SettlementClient {
    /// Create a client without a signer. Live submissions will fail with
    /// `NotAuthorized`; mock submissions are attributed to `signer_address`.
    pub fn new(config: SettlementConfig, signer_address: Address) -> Self {
        Self {
            config,
            signer_address,
            provider: None,
            submit_lock: Mutex::new(()),
            mock_state: Arc::new(RwLock::new(MockState::default())),
        }
    }

    /// Create a client that signs with the given local key
    pub fn with_signer(config: SettlementConfig, signer: PrivateKeySigner) -> Result<Self> {
        let signer_address = signer.address();

        if config.mode != SettlementMode::Live {
            return Ok(Self::new(config, signer_address));
        }

        let url: Url = config
            .rpc_url
            .parse()
            .map_err(|e| SettlementError::InvalidRpcUrl(format!("{}: {}", config.rpc_url, e)))?;
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url)
            .erased();

        Ok(Self::with_provider(config, signer_address, provider))
    }

    /// Create a client around an already built provider. The provider must
    /// sign for `signer_address`.
    pub fn with_provider(
        config: SettlementConfig,
        signer_address: Address,
        provider: DynProvider,
    ) -> Self {
        Self {
            provider: Some(provider),
            ..Self::new(config, signer_address)
        }
    }

    /// Create a client from a hex-encoded secp256k1 private key
    pub fn with_private_key(config: SettlementConfig, private_key: &str) -> Result<Self> {
        let signer: PrivateKeySigner = private_key
            .trim()
            .parse()
            .map_err(|_| SettlementError::InvalidPrivateKey)?;
        Self::with_signer(config, signer)
    }

    /// Address that signs reward transactions
    pub fn signer_address(&self) -> Address {
        self.signer_address
    }

    /// Check if running in mock mode
    pub fn is_mock(&self) -> bool {
        self.config.mode == SettlementMode::Mock
    }

    /// Validate and normalize winners and amounts without submitting
    pub fn prepare<S: AsRef<str>>(
        &self,
        winners: &[S],
        amounts: &[RewardAmount],
    ) -> Result<RewardBatch> {
        let request = RewardRequest::new(
            winners.iter().map(|w| w.as_ref().to_string()),
            amounts.iter().cloned(),
        )?;
        let batch = request.normalize()?;
        debug!(
            "Normalized {} winners: {:?}",
            batch.len(),
            batch.checksummed_winners()
        );
        Ok(batch)
    }

    // ==================== Reward Winners ====================

    /// Pay `amounts[i]` to `winners[i]` in a single escrow transaction.
    ///
    /// Normalization runs first: a length mismatch, a malformed address or an
    /// unrepresentable amount fails the whole call and nothing is submitted.
    /// Every failure is logged before it is returned.
    pub async fn reward_winners<S: AsRef<str>>(
        &self,
        winners: &[S],
        amounts: &[RewardAmount],
    ) -> Result<RewardOutcome> {
        let batch = self.prepare(winners, amounts).map_err(|e| {
            error!("Error preparing reward transaction: {}", e);
            e
        })?;
        self.submit_batch(batch).await
    }

    /// [`reward_winners`](Self::reward_winners) for an already built request
    pub async fn reward_request(&self, request: &RewardRequest) -> Result<RewardOutcome> {
        let batch = request.normalize().map_err(|e| {
            error!("Error preparing reward transaction: {}", e);
            SettlementError::from(e)
        })?;
        self.submit_batch(batch).await
    }

    /// Submit a normalized batch and wait for its confirmation
    pub async fn submit_batch(&self, batch: RewardBatch) -> Result<RewardOutcome> {
        let Some(total) = batch.total() else {
            let e = SettlementError::TransactionFailed("reward total overflows uint256".to_string());
            error!("Error sending reward transaction: {}", e);
            return Err(e);
        };

        info!(
            "Rewarding {} winners, total {} ({} base units)",
            batch.len(),
            format_base_units(total, REWARD_DECIMALS),
            total,
        );

        let result = if self.is_mock() {
            self.submit_mock(&batch).await
        } else {
            self.submit_live(&batch).await
        };

        match result {
            Ok(receipt) => Ok(RewardOutcome {
                tx_hash: receipt.tx_hash,
                receipt,
                winners: batch.len(),
                total,
            }),
            Err(e) => {
                error!("Error sending reward transaction: {}", e);
                Err(e)
            }
        }
    }

    async fn submit_mock(&self, batch: &RewardBatch) -> Result<RewardReceipt> {
        let _guard = self.submit_lock.lock().await;
        let calldata = encode_reward_call(batch);

        // Like a node, the nonce is looked up first and only consumed once
        // the transaction is accepted
        let nonce = self.mock_state.read().expect("settlement lock poisoned").tx_counter;
        tokio::task::yield_now().await;

        let mut state = self.mock_state.write().expect("settlement lock poisoned");

        if let Some(reason) = state.pending_failure.take() {
            return Err(SettlementError::TransactionFailed(reason));
        }

        state.tx_counter = nonce + 1;
        let tx_hash = Self::mock_tx_hash(state.tx_counter, &calldata);
        info!("[MOCK] Transaction sent: {} (nonce {})", tx_hash, nonce);

        let receipt = RewardReceipt {
            tx_hash,
            block_number: Some(state.tx_counter),
            gas_used: Self::mock_gas(&calldata),
            success: true,
        };

        state.submissions.push(MockSubmission {
            tx_hash,
            nonce,
            winners: batch.winners().to_vec(),
            amounts: batch.amounts().to_vec(),
            calldata,
        });

        info!("[MOCK] Transaction confirmed: {:?}", receipt);
        Ok(receipt)
    }

    async fn submit_live(&self, batch: &RewardBatch) -> Result<RewardReceipt> {
        let provider = self
            .provider
            .as_ref()
            .ok_or(SettlementError::NotAuthorized)?;
        let contract_address = self
            .config
            .contract_address
            .ok_or(SettlementError::MissingContract)?;

        let contract = IEscrow::new(contract_address, provider.clone());
        let call = contract.rewardWinners(batch.winners().to_vec(), batch.amounts().to_vec());

        let pending = {
            let _guard = self.submit_lock.lock().await;
            call.send().await.map_err(Self::send_error)?
        };

        let tx_hash = *pending.tx_hash();
        info!("Transaction sent: {}", tx_hash);

        let receipt = pending
            .with_required_confirmations(self.config.confirmations)
            .with_timeout(self.config.confirm_timeout)
            .get_receipt()
            .await
            .map_err(|e| Self::confirmation_error(tx_hash, e))?;

        Self::confirmed_receipt(&receipt)
    }

    /// Transport failures mean the node could not be reached; anything else
    /// is the node rejecting the transaction
    fn send_error(e: alloy::contract::Error) -> SettlementError {
        match e {
            alloy::contract::Error::TransportError(err @ RpcError::Transport(_)) => {
                SettlementError::RpcError(err.to_string())
            }
            other => SettlementError::TransactionFailed(other.to_string()),
        }
    }

    fn confirmation_error(tx_hash: TxHash, e: PendingTransactionError) -> SettlementError {
        match e {
            PendingTransactionError::TxWatcher(WatchTxError::Timeout) => {
                SettlementError::ConfirmationTimeout(tx_hash)
            }
            other => SettlementError::RpcError(other.to_string()),
        }
    }

    /// Status 0 is a revert, reported as an error
    fn confirmed_receipt<R: ReceiptResponse>(receipt: &R) -> Result<RewardReceipt> {
        let receipt = RewardReceipt {
            tx_hash: receipt.transaction_hash(),
            block_number: receipt.block_number(),
            gas_used: receipt.gas_used(),
            success: receipt.status(),
        };

        if !receipt.success {
            warn!("Transaction {} mined but reverted", receipt.tx_hash);
            return Err(SettlementError::Reverted(receipt.tx_hash));
        }

        info!("Transaction confirmed: {:?}", receipt);
        Ok(receipt)
    }

    // ==================== Mock Inspection ====================

    /// Submissions recorded so far (mock mode)
    pub fn mock_submissions(&self) -> Vec<MockSubmission> {
        self.mock_state
            .read()
            .expect("settlement lock poisoned")
            .submissions
            .clone()
    }

    /// Make the next mock submission fail with `TransactionFailed(reason)`
    pub fn fail_next_submission(&self, reason: impl Into<String>) {
        self.mock_state
            .write()
            .expect("settlement lock poisoned")
            .pending_failure = Some(reason.into());
    }

    /// SHA256(counter || calldata)
    fn mock_tx_hash(counter: u64, calldata: &Bytes) -> TxHash {
        let mut hasher = Sha256::new();
        hasher.update(counter.to_le_bytes());
        hasher.update(calldata);
        TxHash::from_slice(&hasher.finalize())
    }

    /// Intrinsic gas of the call: 21000 plus 16 per non-zero calldata byte
    /// and 4 per zero byte
    fn mock_gas(calldata: &Bytes) -> u64 {
        calldata
            .iter()
            .map(|b| if *b == 0 { 4 } else { 16 })
            .sum::<u64>()
            + 21_000
    }
}
