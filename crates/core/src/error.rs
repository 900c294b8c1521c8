use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Bad address checksum: {0}")]
    InvalidChecksum(String),

    #[error("Invalid amount {amount:?}: {reason}")]
    InvalidAmount { amount: String, reason: String },

    #[error("Amount overflows 256 bits: {0}")]
    AmountOverflow(String),

    #[error("Length mismatch: {winners} winners, {amounts} amounts")]
    LengthMismatch { winners: usize, amounts: usize },

    #[error("Reward request has no winners")]
    EmptyRequest,
}

pub type Result<T> = std::result::Result<T, CoreError>;
