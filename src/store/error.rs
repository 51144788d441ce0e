//! Store Errors
//!
//! Error types for store adapter operations.

use uuid::Uuid;

use crate::domain::DomainError;

/// Errors that can occur in the store adapters
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Wallet not found: {0}")]
    WalletNotFound(Uuid),

    /// The customer already owns a wallet
    #[error("Wallet already exists for customer {0}")]
    WalletExists(String),

    /// The wallet status changed since it was read
    #[error("Status of wallet {wallet_id} changed concurrently")]
    StatusConflict { wallet_id: Uuid },

    /// The locked wallet row refused the deposit or withdrawal
    #[error(transparent)]
    Rejected(#[from] DomainError),

    /// Reference id already recorded for this transaction type
    #[error("Reference id already used: {0}")]
    DuplicateReference(String),

    /// A stored row does not satisfy the domain invariants
    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    /// The backing store refused the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
