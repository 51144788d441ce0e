//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

/// Business rule violations of the wallet ledger.
///
/// Each variant carries a stable, human-readable description that is
/// surfaced to the caller as the `error_description` of the error envelope.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// No wallet has ever been enabled for the customer
    #[error("Wallet not enabled")]
    NotEnabled,

    /// Money movement attempted on a disabled wallet
    #[error("Wallet disabled")]
    WalletDisabled,

    /// Enable called on a wallet that is already enabled
    #[error("Wallet already enabled")]
    AlreadyEnabled,

    /// Disable called on a wallet that is already disabled
    #[error("Wallet already disabled")]
    AlreadyDisabled,

    /// The caller-supplied reference id was already used for this transaction type
    #[error("Reference id already used")]
    ReferenceAlreadyUsed { reference_id: String },

    /// Withdrawal larger than the current balance
    #[error("Wallet balance not enough")]
    InsufficientBalance {
        required: rust_decimal::Decimal,
        available: rust_decimal::Decimal,
    },

    /// Invalid amount (zero, negative, too precise or exceeds limit)
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

impl DomainError {
    /// Create an insufficient balance error
    pub fn insufficient_balance(
        required: rust_decimal::Decimal,
        available: rust_decimal::Decimal,
    ) -> Self {
        Self::InsufficientBalance { required, available }
    }

    /// Create a reference-already-used error
    pub fn reference_already_used(reference_id: impl Into<String>) -> Self {
        Self::ReferenceAlreadyUsed {
            reference_id: reference_id.into(),
        }
    }
}

impl From<super::AmountError> for DomainError {
    fn from(err: super::AmountError) -> Self {
        Self::InvalidAmount(err.to_string())
    }
}
