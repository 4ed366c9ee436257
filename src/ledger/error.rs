use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(i64),

    #[error("Invalid activity type: {0}")]
    InvalidKind(String),

    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    #[error("Activity not found: {0}")]
    EntryNotFound(Uuid),

    #[error("Insufficient tokens in account {account_id}: balance {balance}, required {required}")]
    InsufficientBalance {
        account_id: Uuid,
        balance: i64,
        required: i64,
    },

    #[error("Storage failure: {0}")]
    StorageFailure(#[from] sqlx::Error),
}
