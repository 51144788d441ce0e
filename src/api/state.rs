//! Shared router state

use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::TokenService;
use crate::config::Config;
use crate::handlers::{DepositHandler, InitAccountHandler, WalletHandler, WithdrawalHandler};
use crate::store::{
    AccountStore, InMemoryStore, PgAccountStore, PgTransactionStore, PgWalletStore,
    TransactionStore, WalletStore,
};

/// Store capabilities and the token service, cloned into every request
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountStore>,
    pub wallets: Arc<dyn WalletStore>,
    pub transactions: Arc<dyn TransactionStore>,
    pub tokens: TokenService,
}

impl AppState {
    /// State backed by PostgreSQL
    pub fn postgres(pool: PgPool, config: &Config) -> Self {
        Self {
            accounts: Arc::new(PgAccountStore::new(pool.clone())),
            wallets: Arc::new(PgWalletStore::new(pool.clone())),
            transactions: Arc::new(PgTransactionStore::new(pool)),
            tokens: TokenService::new(&config.jwt_secret, config.token_ttl_hours),
        }
    }

    /// State backed by a single in-memory store
    pub fn in_memory(store: InMemoryStore, tokens: TokenService) -> Self {
        Self {
            accounts: Arc::new(store.clone()),
            wallets: Arc::new(store.clone()),
            transactions: Arc::new(store),
            tokens,
        }
    }

    pub fn init_account_handler(&self) -> InitAccountHandler {
        InitAccountHandler::new(self.accounts.clone(), self.tokens.clone())
    }

    pub fn wallet_handler(&self) -> WalletHandler {
        WalletHandler::new(self.wallets.clone())
    }

    pub fn deposit_handler(&self) -> DepositHandler {
        DepositHandler::new(self.wallets.clone(), self.transactions.clone())
    }

    pub fn withdrawal_handler(&self) -> WithdrawalHandler {
        WithdrawalHandler::new(self.wallets.clone(), self.transactions.clone())
    }
}
