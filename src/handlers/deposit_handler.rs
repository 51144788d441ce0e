//! Deposit Handler
//!
//! Credits the caller's wallet. The wallet read here only fails obvious
//! requests early; the store re-reads the wallet under its row lock and
//! computes the new balance from that locked row.

use std::sync::Arc;

use crate::domain::{Deposit, DomainError, NewDeposit, OperationContext};
use crate::error::{AppError, Resource};
use crate::store::{StoreError, TransactionStore, WalletStore};

use super::DepositCommand;

/// Handler for deposits
pub struct DepositHandler {
    wallets: Arc<dyn WalletStore>,
    transactions: Arc<dyn TransactionStore>,
}

impl DepositHandler {
    pub fn new(wallets: Arc<dyn WalletStore>, transactions: Arc<dyn TransactionStore>) -> Self {
        Self {
            wallets,
            transactions,
        }
    }

    /// Execute the deposit command
    pub async fn execute(
        &self,
        command: DepositCommand,
        context: &OperationContext,
    ) -> Result<Deposit, AppError> {
        if command.reference_id.trim().is_empty() {
            return Err(AppError::InvalidRequest("Params reference_id empty".to_string()));
        }

        context.ensure_active()?;
        let wallet = self
            .wallets
            .find_wallet_by_owner(&command.customer_xid)
            .await?
            .ok_or_else(|| reject(DomainError::NotEnabled))?;
        wallet.deposit(&command.amount).map_err(reject)?;

        context.ensure_active()?;
        if self
            .transactions
            .find_deposit_by_reference(&command.reference_id)
            .await?
            .is_some()
        {
            return Err(reject(DomainError::reference_already_used(&command.reference_id)));
        }

        context.ensure_active()?;
        let deposit = self
            .transactions
            .create_deposit(NewDeposit::success(
                &command.customer_xid,
                &command.reference_id,
                command.amount,
            ))
            .await
            .map_err(store_error)?;

        tracing::info!(
            deposit_id = %deposit.id,
            customer_xid = %deposit.deposited_by,
            reference_id = %deposit.reference_id,
            amount = %deposit.amount,
            correlation_id = ?context.correlation_id,
            "Deposit committed"
        );

        Ok(deposit)
    }
}

fn reject(err: DomainError) -> AppError {
    AppError::rejected(Resource::Deposit, err)
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
