use crate::token::{Amount, MinterId};
use thiserror::Error;

/// Rejections raised by ledger operations
///
/// Every variant is returned before any state is touched, so a failed
/// operation is never partially applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Caller is not the ledger owner")]
    Unauthorized,

    #[error("Ledger is paused")]
    Paused,

    #[error("zero amount")]
    ZeroAmount,

    #[error("zero address")]
    ZeroAddress,

    #[error("Invalid minter: the empty identifier cannot be registered")]
    InvalidMinter,

    #[error("not minter address: {0}")]
    UnknownMinter(MinterId),

    #[error("already minter: {0}")]
    AlreadyRegistered(MinterId),

    #[error("burn amount exceeds balance: minter {minter} holds {available}, required {required}")]
    InsufficientBucketBalance {
        minter: MinterId,
        available: Amount,
        required: Amount,
    },

    #[error("transfer amount exceeds balance: available {available}, required {required}")]
    InsufficientBalance { available: Amount, required: Amount },

    #[error("insufficient allowance: available {available}, required {required}")]
    InsufficientAllowance { available: Amount, required: Amount },

    #[error("decreased allowance below zero")]
    AllowanceBelowZero,

    #[error("Ledger is already initialized")]
    AlreadyInitialized,

    #[error("Ledger is not initialized")]
    NotInitialized,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid upgrade: logic version {requested} does not follow {current}")]
    InvalidUpgrade { current: u32, requested: u32 },

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Ledger invariant violated: {0}")]
    InvariantViolation(String),
}
