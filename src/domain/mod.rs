//! Domain module
//!
//! Core domain types and business rules of the wallet ledger.

pub mod amount;
pub mod context;
pub mod error;
pub mod transaction;
pub mod wallet;

pub use amount::{Amount, AmountError, Balance};
pub use context::{Cancelled, OperationContext};
pub use error::DomainError;
pub use transaction::{
    Deposit, NewDeposit, NewWithdrawal, TransactionKind, TransactionStatus, Withdrawal,
};
pub use wallet::{NewWallet, Wallet, WalletStatus};
