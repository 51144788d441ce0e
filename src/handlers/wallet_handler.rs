//! Wallet Handler
//!
//! Enable, disable and balance queries. Status writes are conditional on
//! the status that was read, so two racing transitions cannot both win.

use std::sync::Arc;

use crate::domain::{DomainError, NewWallet, OperationContext, Wallet, WalletStatus};
use crate::error::{AppError, Resource};
use crate::store::{StoreError, WalletStore};

/// Lifecycle operations on the caller's wallet
pub struct WalletHandler {
    wallets: Arc<dyn WalletStore>,
}

impl WalletHandler {
    pub fn new(wallets: Arc<dyn WalletStore>) -> Self {
        Self { wallets }
    }

    /// Create the wallet on first call, re-enable a disabled one otherwise
    pub async fn enable(
        &self,
        customer_xid: &str,
        context: &OperationContext,
    ) -> Result<Wallet, AppError> {
        context.ensure_active()?;
        let existing = self.wallets.find_wallet_by_owner(customer_xid).await?;

        let wallet = match existing {
            None => {
                context.ensure_active()?;
                self.wallets
                    .create_wallet(NewWallet::enabled_for(customer_xid))
                    .await
                    .map_err(|e| match e {
                        // Lost the race against a concurrent first enable
                        StoreError::WalletExists(_) => {
                            AppError::rejected(Resource::Wallet, DomainError::AlreadyEnabled)
                        }
                        other => other.into(),
                    })?
            }
            Some(wallet) => {
                let enabled = wallet.enable().map_err(reject)?;
                self.write_status(&enabled, WalletStatus::Disabled, context)
                    .await?
            }
        };

        tracing::info!(
            wallet_id = %wallet.id,
            customer_xid,
            "Wallet enabled"
        );

        Ok(wallet)
    }

    /// Disable the wallet; money movement and balance reads stop until re-enabled
    pub async fn disable(
        &self,
        customer_xid: &str,
        context: &OperationContext,
    ) -> Result<Wallet, AppError> {
        let wallet = self.load(customer_xid, context).await?;

        let disabled = wallet.disable().map_err(reject)?;
        let wallet = self
            .write_status(&disabled, WalletStatus::Enabled, context)
            .await?;

        tracing::info!(
            wallet_id = %wallet.id,
            customer_xid,
            "Wallet disabled"
        );

        Ok(wallet)
    }

    /// Current wallet state; a disabled wallet's balance is not observable
    pub async fn get(
        &self,
        customer_xid: &str,
        context: &OperationContext,
    ) -> Result<Wallet, AppError> {
        let wallet = self.load(customer_xid, context).await?;
        wallet.ensure_enabled().map_err(reject)?;
        Ok(wallet)
    }

    async fn load(&self, customer_xid: &str, context: &OperationContext) -> Result<Wallet, AppError> {
        context.ensure_active()?;
        self.wallets
            .find_wallet_by_owner(customer_xid)
            .await?
            .ok_or_else(|| reject(DomainError::NotEnabled))
    }

    async fn write_status(
        &self,
        wallet: &Wallet,
        from: WalletStatus,
        context: &OperationContext,
    ) -> Result<Wallet, AppError> {
        context.ensure_active()?;
        self.wallets
            .transition_status(wallet, from)
            .await
            .map_err(|e| match e {
                // Somebody else completed the same transition first
                StoreError::StatusConflict { .. } => reject(match wallet.status {
                    WalletStatus::Enabled => DomainError::AlreadyEnabled,
                    WalletStatus::Disabled => DomainError::AlreadyDisabled,
                }),
                other => other.into(),
            })
    }
}

fn reject(err: DomainError) -> AppError {
    AppError::rejected(Resource::Wallet, err)
}
