//! Store module
//!
//! Persistence capabilities consumed by the handlers. Each adapter is a
//! trait so the handlers run unchanged against PostgreSQL or the
//! in-memory store used in tests.

mod error;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::domain::{
    Deposit, NewDeposit, NewWallet, NewWithdrawal, Wallet, WalletStatus, Withdrawal,
};

pub use error::StoreError;
pub use memory::InMemoryStore;
pub use postgres::{PgAccountStore, PgTransactionStore, PgWalletStore};

/// Registered customers
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Whether the customer has been initialized before
    async fn account_exists(&self, customer_xid: &str) -> Result<bool, StoreError>;

    /// Register the customer; registering twice is a no-op
    async fn create_account(&self, customer_xid: &str) -> Result<(), StoreError>;
}

/// One wallet per customer
#[async_trait]
pub trait WalletStore: Send + Sync {
    async fn find_wallet_by_owner(&self, customer_xid: &str) -> Result<Option<Wallet>, StoreError>;

    /// Insert a wallet; fails with `WalletExists` if the owner already has one
    async fn create_wallet(&self, wallet: NewWallet) -> Result<Wallet, StoreError>;

    /// Write `wallet.status` provided the stored row is still in `from`.
    /// Returns the row as stored after the write.
    async fn transition_status(
        &self,
        wallet: &Wallet,
        from: WalletStatus,
    ) -> Result<Wallet, StoreError>;
}

/// Deposit and withdrawal records.
///
/// `create_deposit` / `create_withdrawal` own the whole read-modify-write of
/// the balance. They lock the owner's wallet row, apply `Wallet::deposit` or
/// `Wallet::withdraw` to the locked row, insert the record and write the new
/// balance, and commit all of it together. A rule broken by the locked row
/// (no wallet, disabled, insufficient balance) fails with `Rejected` and
/// leaves nothing behind. A reference id reused within one transaction type
/// fails with `DuplicateReference`.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn find_deposit_by_reference(
        &self,
        reference_id: &str,
    ) -> Result<Option<Deposit>, StoreError>;

    async fn find_withdrawal_by_reference(
        &self,
        reference_id: &str,
    ) -> Result<Option<Withdrawal>, StoreError>;

    async fn create_deposit(&self, deposit: NewDeposit) -> Result<Deposit, StoreError>;

    async fn create_withdrawal(&self, withdrawal: NewWithdrawal) -> Result<Withdrawal, StoreError>;
}
