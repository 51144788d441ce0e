//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Extension, State},
    middleware,
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthError;
use crate::domain::{Amount, Deposit, OperationContext, Wallet, Withdrawal};
use crate::error::{AppError, AppResult};
use crate::handlers::{DepositCommand, InitAccountCommand, WithdrawalCommand};

use super::extract::Payload;
use super::middleware::{auth_middleware, logging_middleware};
use super::AppState;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct InitRequest {
    #[serde(default)]
    pub customer_xid: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DisableRequest {
    #[serde(default)]
    pub is_disabled: Option<bool>,
}

/// Body of deposit and withdrawal requests
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionRequest {
    #[serde(default)]
    pub reference_id: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
}

/// Success envelope: `{"data": ..., "status": "success"}`
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub data: T,
    pub status: &'static str,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Json<Self> {
        Json(Self {
            data,
            status: "success",
        })
    }
}

#[derive(Debug, Serialize)]
pub struct TokenView {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct WalletView {
    pub id: Uuid,
    pub owned_by: String,
    pub status: &'static str,
    pub enabled_at: DateTime<Utc>,
    pub balance: Decimal,
}

impl From<Wallet> for WalletView {
    fn from(wallet: Wallet) -> Self {
        Self {
            id: wallet.id,
            owned_by: wallet.owned_by,
            status: wallet.status.label(),
            enabled_at: wallet.enabled_at,
            balance: wallet.balance.value(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DepositView {
    pub id: Uuid,
    pub deposited_by: String,
    pub status: &'static str,
    pub deposited_at: DateTime<Utc>,
    pub amount: Decimal,
    pub reference_id: String,
}

impl From<Deposit> for DepositView {
    fn from(deposit: Deposit) -> Self {
        Self {
            id: deposit.id,
            deposited_by: deposit.deposited_by,
            status: deposit.status.label(),
            deposited_at: deposit.deposited_at,
            amount: deposit.amount.value(),
            reference_id: deposit.reference_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WithdrawalView {
    pub id: Uuid,
    pub withdrawn_by: String,
    pub status: &'static str,
    pub withdrawn_at: DateTime<Utc>,
    pub amount: Decimal,
    pub reference_id: String,
}

impl From<Withdrawal> for WithdrawalView {
    fn from(withdrawal: Withdrawal) -> Self {
        Self {
            id: withdrawal.id,
            withdrawn_by: withdrawal.withdrawn_by,
            status: withdrawal.status.label(),
            withdrawn_at: withdrawal.withdrawn_at,
            amount: withdrawal.amount.value(),
            reference_id: withdrawal.reference_id,
        }
    }
}

// =========================================================================
// Request validation
// =========================================================================

impl TransactionRequest {
    /// Validated `(reference_id, amount)`
    fn validate(self) -> Result<(String, Amount), AppError> {
        let reference_id = self
            .reference_id
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .ok_or_else(|| AppError::InvalidRequest("Params reference_id empty".to_string()))?;

        let amount = self
            .amount
            .and_then(|a| Amount::new(a).ok())
            .ok_or_else(|| AppError::InvalidRequest("Params amount not valid".to_string()))?;

        Ok((reference_id, amount))
    }
}

/// Customer resolved by the auth middleware
fn customer_of(context: &OperationContext) -> Result<&str, AppError> {
    context
        .customer_xid
        .as_deref()
        .ok_or(AppError::Unauthorized(AuthError::MissingToken))
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router(state: AppState) -> Router<AppState> {
    let wallet_routes = Router::new()
        .route(
            "/wallet",
            post(enable_wallet).get(get_wallet).patch(disable_wallet),
        )
        .route(
            "/wallet/",
            post(enable_wallet).get(get_wallet).patch(disable_wallet),
        )
        .route("/wallet/deposits", post(create_deposit))
        .route("/wallet/withdrawals", post(create_withdrawal))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/init", post(init_account))
        .merge(wallet_routes)
        .layer(middleware::from_fn(logging_middleware))
}

// =========================================================================
// POST /init
// =========================================================================

/// Register a customer and issue a token
async fn init_account(
    State(state): State<AppState>,
    Payload(request): Payload<InitRequest>,
) -> AppResult<Json<Envelope<TokenView>>> {
    let customer_xid = request
        .customer_xid
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| AppError::InvalidRequest("Params customer_xid empty".to_string()))?;

    let result = state
        .init_account_handler()
        .execute(InitAccountCommand::new(customer_xid), &OperationContext::new())
        .await?;

    Ok(Envelope::success(TokenView {
        token: result.token,
    }))
}

// =========================================================================
// /wallet
// =========================================================================

/// Enable the caller's wallet, creating it on first use
async fn enable_wallet(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
) -> AppResult<Json<Envelope<WalletView>>> {
    let customer_xid = customer_of(&context)?;
    let wallet = state.wallet_handler().enable(customer_xid, &context).await?;
    Ok(Envelope::success(wallet.into()))
}

/// View the caller's wallet balance
async fn get_wallet(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
) -> AppResult<Json<Envelope<WalletView>>> {
    let customer_xid = customer_of(&context)?;
    let wallet = state.wallet_handler().get(customer_xid, &context).await?;
    Ok(Envelope::success(wallet.into()))
}

/// Disable the caller's wallet (`is_disabled=true`)
async fn disable_wallet(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Payload(request): Payload<DisableRequest>,
) -> AppResult<Json<Envelope<WalletView>>> {
    if request.is_disabled != Some(true) {
        return Err(AppError::InvalidRequest("Params is_disabled empty".to_string()));
    }

    let customer_xid = customer_of(&context)?;
    let wallet = state.wallet_handler().disable(customer_xid, &context).await?;
    Ok(Envelope::success(wallet.into()))
}

// =========================================================================
// POST /wallet/deposits
// =========================================================================

async fn create_deposit(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Payload(request): Payload<TransactionRequest>,
) -> AppResult<Json<Envelope<DepositView>>> {
    let (reference_id, amount) = request.validate()?;
    let customer_xid = customer_of(&context)?;

    let deposit = state
        .deposit_handler()
        .execute(DepositCommand::new(customer_xid, reference_id, amount), &context)
        .await?;

    Ok(Envelope::success(deposit.into()))
}

// =========================================================================
// POST /wallet/withdrawals
// =========================================================================

async fn create_withdrawal(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Payload(request): Payload<TransactionRequest>,
) -> AppResult<Json<Envelope<WithdrawalView>>> {
    let (reference_id, amount) = request.validate()?;
    let customer_xid = customer_of(&context)?;

    let withdrawal = state
        .withdrawal_handler()
        .execute(WithdrawalCommand::new(customer_xid, reference_id, amount), &context)
        .await?;

    Ok(Envelope::success(withdrawal.into()))
}
