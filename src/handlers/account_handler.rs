//! Account Handler
//!
//! Registers a customer and hands out a signed token for the wallet routes.

use std::sync::Arc;

use crate::auth::TokenService;
use crate::domain::OperationContext;
use crate::error::AppError;
use crate::store::AccountStore;

use super::{InitAccountCommand, InitAccountResult};

/// Handler for `POST /init`
pub struct InitAccountHandler {
    accounts: Arc<dyn AccountStore>,
    tokens: TokenService,
}

impl InitAccountHandler {
    pub fn new(accounts: Arc<dyn AccountStore>, tokens: TokenService) -> Self {
        Self { accounts, tokens }
    }

    /// Register the customer if needed and issue a token.
    /// Initializing the same customer again only issues a fresh token.
    pub async fn execute(
        &self,
        command: InitAccountCommand,
        context: &OperationContext,
    ) -> Result<InitAccountResult, AppError> {
        let customer_xid = command.customer_xid.trim();
        if customer_xid.is_empty() {
            return Err(AppError::InvalidRequest("Params customer_xid empty".to_string()));
        }

        context.ensure_active()?;
        if !self.accounts.account_exists(customer_xid).await? {
            context.ensure_active()?;
            self.accounts.create_account(customer_xid).await?;
            tracing::info!(customer_xid, "Account initialized");
        }

        let token = self.tokens.issue(customer_xid)?;

        Ok(InitAccountResult { token })
    }
}
