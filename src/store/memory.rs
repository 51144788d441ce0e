//! In-memory store
//!
//! Implements every store capability over a single mutex-guarded state with
//! the same commit rules as the PostgreSQL adapters. Used by the handler and
//! API tests, and handy for running the server without a database.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{
    Amount, Balance, Deposit, DomainError, NewDeposit, NewWallet, NewWithdrawal,
    TransactionKind, Wallet, WalletStatus, Withdrawal,
};

use super::{AccountStore, StoreError, TransactionStore, WalletStore};

#[derive(Debug, Default)]
struct State {
    accounts: HashSet<String>,
    wallets: HashMap<Uuid, Wallet>,
    deposits: Vec<Deposit>,
    withdrawals: Vec<Withdrawal>,
    fail_next_commit: bool,
}

impl State {
    fn take_injected_failure(&mut self) -> Result<(), StoreError> {
        if std::mem::take(&mut self.fail_next_commit) {
            return Err(StoreError::Unavailable("injected commit failure".to_string()));
        }
        Ok(())
    }

    /// Owner's wallet and the balance it would hold after the movement
    fn plan_movement(
        &self,
        kind: TransactionKind,
        owner: &str,
        amount: &Amount,
    ) -> Result<(Uuid, Balance), StoreError> {
        let wallet = self
            .wallets
            .values()
            .find(|w| w.owned_by == owner)
            .ok_or(DomainError::NotEnabled)?;

        Ok((wallet.id, kind.apply(wallet, amount)?))
    }

    fn write_balance(&mut self, wallet_id: Uuid, balance: Balance) {
        if let Some(wallet) = self.wallets.get_mut(&wallet_id) {
            wallet.balance = balance;
        }
    }
}

/// Shared in-memory store; clones see the same data
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next deposit/withdrawal commit fail without touching any state
    pub async fn fail_next_commit(&self) {
        self.inner.lock().await.fail_next_commit = true;
    }

    /// All recorded deposits, in commit order
    pub async fn deposits(&self) -> Vec<Deposit> {
        self.inner.lock().await.deposits.clone()
    }

    /// All recorded withdrawals, in commit order
    pub async fn withdrawals(&self) -> Vec<Withdrawal> {
        self.inner.lock().await.withdrawals.clone()
    }
}

#[async_trait]
impl AccountStore for InMemoryStore {
    async fn account_exists(&self, customer_xid: &str) -> Result<bool, StoreError> {
        Ok(self.inner.lock().await.accounts.contains(customer_xid))
    }

    async fn create_account(&self, customer_xid: &str) -> Result<(), StoreError> {
        self.inner
            .lock()
            .await
            .accounts
            .insert(customer_xid.to_string());
        Ok(())
    }
}

#[async_trait]
impl WalletStore for InMemoryStore {
    async fn find_wallet_by_owner(&self, customer_xid: &str) -> Result<Option<Wallet>, StoreError> {
        let state = self.inner.lock().await;
        Ok(state
            .wallets
            .values()
            .find(|w| w.owned_by == customer_xid)
            .cloned())
    }

    async fn create_wallet(&self, wallet: NewWallet) -> Result<Wallet, StoreError> {
        let mut state = self.inner.lock().await;

        if state.wallets.values().any(|w| w.owned_by == wallet.owned_by) {
            return Err(StoreError::WalletExists(wallet.owned_by));
        }

        let stored = Wallet {
            id: Uuid::new_v4(),
            owned_by: wallet.owned_by,
            status: wallet.status,
            enabled_at: wallet.enabled_at,
            balance: wallet.balance,
        };
        state.wallets.insert(stored.id, stored.clone());

        Ok(stored)
    }

    async fn transition_status(
        &self,
        wallet: &Wallet,
        from: WalletStatus,
    ) -> Result<Wallet, StoreError> {
        let mut state = self.inner.lock().await;

        let stored = state
            .wallets
            .get_mut(&wallet.id)
            .ok_or(StoreError::WalletNotFound(wallet.id))?;

        if stored.status != from {
            return Err(StoreError::StatusConflict {
                wallet_id: wallet.id,
            });
        }

        stored.status = wallet.status;
        Ok(stored.clone())
    }
}

#[async_trait]
impl TransactionStore for InMemoryStore {
    async fn find_deposit_by_reference(
        &self,
        reference_id: &str,
    ) -> Result<Option<Deposit>, StoreError> {
        let state = self.inner.lock().await;
        Ok(state
            .deposits
            .iter()
            .find(|d| d.reference_id == reference_id)
            .cloned())
    }

    async fn find_withdrawal_by_reference(
        &self,
        reference_id: &str,
    ) -> Result<Option<Withdrawal>, StoreError> {
        let state = self.inner.lock().await;
        Ok(state
            .withdrawals
            .iter()
            .find(|w| w.reference_id == reference_id)
            .cloned())
    }

    async fn create_deposit(&self, deposit: NewDeposit) -> Result<Deposit, StoreError> {
        // Held across read, check and write, like the row lock in PostgreSQL
        let mut state = self.inner.lock().await;

        state.take_injected_failure()?;
        let (wallet_id, balance) =
            state.plan_movement(TransactionKind::Deposit, &deposit.deposited_by, &deposit.amount)?;

        if state
            .deposits
            .iter()
            .any(|d| d.reference_id == deposit.reference_id)
        {
            return Err(StoreError::DuplicateReference(deposit.reference_id));
        }

        let deposit = deposit.into_deposit(Uuid::new_v4());
        state.deposits.push(deposit.clone());
        state.write_balance(wallet_id, balance);

        Ok(deposit)
    }

    async fn create_withdrawal(&self, withdrawal: NewWithdrawal) -> Result<Withdrawal, StoreError> {
        let mut state = self.inner.lock().await;

        state.take_injected_failure()?;
        let (wallet_id, balance) = state.plan_movement(
            TransactionKind::Withdrawal,
            &withdrawal.withdrawn_by,
            &withdrawal.amount,
        )?;

        if state
            .withdrawals
            .iter()
            .any(|w| w.reference_id == withdrawal.reference_id)
        {
            return Err(StoreError::DuplicateReference(withdrawal.reference_id));
        }

        let withdrawal = withdrawal.into_withdrawal(Uuid::new_v4());
        state.withdrawals.push(withdrawal.clone());
        state.write_balance(wallet_id, balance);

        Ok(withdrawal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    async fn enabled_wallet(store: &InMemoryStore) -> Wallet {
        store
            .create_wallet(NewWallet::enabled_for("C1"))
            .await
            .unwrap()
    }

    #[test]
    fn test_create_account_is_idempotent() {
        let store = InMemoryStore::new();

        tokio_test::block_on(async {
            assert!(!store.account_exists("C1").await.unwrap());
            tokio_test::assert_ok!(store.create_account("C1").await);
            tokio_test::assert_ok!(store.create_account("C1").await);
            assert!(store.account_exists("C1").await.unwrap());
        });
    }

    #[tokio::test]
    async fn test_create_wallet_once_per_owner() {
        let store = InMemoryStore::new();
        enabled_wallet(&store).await;

        let result = store.create_wallet(NewWallet::enabled_for("C1")).await;
        assert!(matches!(result, Err(StoreError::WalletExists(owner)) if owner == "C1"));
    }

    #[tokio::test]
    async fn test_transition_status_requires_expected_from() {
        let store = InMemoryStore::new();
        let wallet = enabled_wallet(&store).await;

        let disabled = wallet.disable().unwrap();
        let stored = store
            .transition_status(&disabled, WalletStatus::Enabled)
            .await
            .unwrap();
        assert_eq!(stored.status, WalletStatus::Disabled);

        // Second writer still believes the wallet is enabled
        let result = store.transition_status(&disabled, WalletStatus::Enabled).await;
        assert!(matches!(result, Err(StoreError::StatusConflict { .. })));
    }

    #[tokio::test]
    async fn test_movement_computed_from_stored_balance() {
        let store = InMemoryStore::new();
        enabled_wallet(&store).await;
        let amount = Amount::from_integer(100).unwrap();

        store
            .create_deposit(NewDeposit::success("C1", "R1", amount))
            .await
            .unwrap();
        store
            .create_deposit(NewDeposit::success("C1", "R2", amount))
            .await
            .unwrap();
        store
            .create_withdrawal(NewWithdrawal::success("C1", "W1", Amount::from_integer(50).unwrap()))
            .await
            .unwrap();

        let wallet = store.find_wallet_by_owner("C1").await.unwrap().unwrap();
        assert_eq!(wallet.balance.value(), dec!(150));
        assert_eq!(store.deposits().await.len(), 2);
        assert_eq!(store.withdrawals().await.len(), 1);
    }

    #[tokio::test]
    async fn test_locked_wallet_rules_reject_without_writing() {
        let store = InMemoryStore::new();
        let amount = Amount::from_integer(100).unwrap();

        let result = store.create_deposit(NewDeposit::success("C1", "R1", amount)).await;
        assert!(matches!(result, Err(StoreError::Rejected(DomainError::NotEnabled))));

        let wallet = enabled_wallet(&store).await;
        let result = store
            .create_withdrawal(NewWithdrawal::success("C1", "W1", amount))
            .await;
        assert!(matches!(
            result,
            Err(StoreError::Rejected(DomainError::InsufficientBalance { .. }))
        ));

        store
            .transition_status(&wallet.disable().unwrap(), WalletStatus::Enabled)
            .await
            .unwrap();
        let result = store.create_deposit(NewDeposit::success("C1", "R2", amount)).await;
        assert!(matches!(result, Err(StoreError::Rejected(DomainError::WalletDisabled))));

        assert!(store.deposits().await.is_empty());
        assert!(store.withdrawals().await.is_empty());
        let wallet = store.find_wallet_by_owner("C1").await.unwrap().unwrap();
        assert_eq!(wallet.balance, Balance::zero());
    }

    #[tokio::test]
    async fn test_injected_failure_leaves_no_trace() {
        let store = InMemoryStore::new();
        enabled_wallet(&store).await;
        let amount = Amount::from_integer(100).unwrap();

        store.fail_next_commit().await;
        let result = store.create_deposit(NewDeposit::success("C1", "R1", amount)).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));

        let wallet = store.find_wallet_by_owner("C1").await.unwrap().unwrap();
        assert_eq!(wallet.balance, Balance::zero());
        assert!(store.deposits().await.is_empty());
        assert!(store.find_deposit_by_reference("R1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reference_scoped_per_transaction_type() {
        let store = InMemoryStore::new();
        enabled_wallet(&store).await;
        let amount = Amount::from_integer(100).unwrap();

        store
            .create_deposit(NewDeposit::success("C1", "R1", amount))
            .await
            .unwrap();
        let withdrawal = store
            .create_withdrawal(NewWithdrawal::success("C1", "R1", amount))
            .await
            .unwrap();
        assert_eq!(withdrawal.reference_id, "R1");

        let result = store.create_deposit(NewDeposit::success("C1", "R1", amount)).await;
        assert!(matches!(result, Err(StoreError::DuplicateReference(r)) if r == "R1"));

        let wallet = store.find_wallet_by_owner("C1").await.unwrap().unwrap();
        assert_eq!(wallet.balance, Balance::zero());
    }
}
