//! Withdrawal Handler
//!
//! Debits the caller's wallet. A withdrawal never takes the balance below
//! zero; the store enforces that against the locked wallet row, so two
//! withdrawals racing for the last funds cannot both pass.

use std::sync::Arc;

use crate::domain::{DomainError, NewWithdrawal, OperationContext, Withdrawal};
use crate::error::{AppError, Resource};
use crate::store::{StoreError, TransactionStore, WalletStore};

use super::WithdrawalCommand;

/// Handler for withdrawals
pub struct WithdrawalHandler {
    wallets: Arc<dyn WalletStore>,
    transactions: Arc<dyn TransactionStore>,
}

impl WithdrawalHandler {
    pub fn new(wallets: Arc<dyn WalletStore>, transactions: Arc<dyn TransactionStore>) -> Self {
        Self {
            wallets,
            transactions,
        }
    }

    /// Execute the withdrawal command
    pub async fn execute(
        &self,
        command: WithdrawalCommand,
        context: &OperationContext,
    ) -> Result<Withdrawal, AppError> {
        if command.reference_id.trim().is_empty() {
            return Err(AppError::InvalidRequest("Params reference_id empty".to_string()));
        }

        context.ensure_active()?;
        let wallet = self
            .wallets
            .find_wallet_by_owner(&command.customer_xid)
            .await?
            .ok_or_else(|| reject(DomainError::NotEnabled))?;

        // Disabled wallet and insufficient balance, in that order
        wallet.withdraw(&command.amount).map_err(reject)?;

        context.ensure_active()?;
        if self
            .transactions
            .find_withdrawal_by_reference(&command.reference_id)
            .await?
            .is_some()
        {
            return Err(reject(DomainError::reference_already_used(&command.reference_id)));
        }

        context.ensure_active()?;
        let withdrawal = self
            .transactions
            .create_withdrawal(NewWithdrawal::success(
                &command.customer_xid,
                &command.reference_id,
                command.amount,
            ))
            .await
            .map_err(store_error)?;

        tracing::info!(
            withdrawal_id = %withdrawal.id,
            customer_xid = %withdrawal.withdrawn_by,
            reference_id = %withdrawal.reference_id,
            amount = %withdrawal.amount,
            correlation_id = ?context.correlation_id,
            "Withdrawal committed"
        );

        Ok(withdrawal)
    }
}

fn reject(err: DomainError) -> AppError {
    AppError::rejected(Resource::Withdrawal, err)
}

fn store_error(err: StoreError) -> AppError {
    match err {
        StoreError::Rejected(rule) => reject(rule),
        StoreError::DuplicateReference(reference_id) => {
            reject(DomainError::reference_already_used(reference_id))
        }
        other => other.into(),
    }
}
