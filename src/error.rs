//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::auth::AuthError;
use crate::domain::{Cancelled, DomainError};
use crate::store::StoreError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Resource a business rule rejection is reported against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Account,
    Wallet,
    Deposit,
    Withdrawal,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Account => "Account",
            Resource::Wallet => "Wallet",
            Resource::Deposit => "Deposit",
            Resource::Withdrawal => "Withdrawal",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Request invalid: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Unauthorized(#[from] AuthError),

    #[error("{resource}: {source}")]
    Rejected {
        resource: Resource,
        source: DomainError,
    },

    #[error("Operation cancelled")]
    Cancelled,

    // Server errors (5xx)
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn rejected(resource: Resource, source: DomainError) -> Self {
        AppError::Rejected { resource, source }
    }

    /// The domain rule behind a rejection, if any
    pub fn domain_error(&self) -> Option<&DomainError> {
        match self {
            AppError::Rejected { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<Cancelled> for AppError {
    fn from(_: Cancelled) -> Self {
        AppError::Cancelled
    }
}

/// One entry of the error list
#[derive(Debug, Serialize)]
pub struct ErrorItem {
    pub error_name: String,
    pub error_description: String,
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error_list: Vec<ErrorItem>,
    pub code: u16,
}

const INTERNAL_NAME: &str = "internal_server_error";
const INTERNAL_DESCRIPTION: &str = "The server is unable to complete your request";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, name, description) = match &self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "Request invalid".to_string(), msg.clone())
            }

            AppError::Unauthorized(auth_err) => match auth_err {
                AuthError::MissingToken => (
                    StatusCode::BAD_REQUEST,
                    "Request invalid".to_string(),
                    auth_err.to_string(),
                ),
                AuthError::InvalidSignature => (
                    StatusCode::UNAUTHORIZED,
                    "Unauthorized user".to_string(),
                    "You are not authorized to use this function".to_string(),
                ),
                AuthError::Expired | AuthError::Malformed(_) => {
                    tracing::debug!("Rejected token: {}", auth_err);
                    (
                        StatusCode::BAD_REQUEST,
                        "bad_request".to_string(),
                        "Your request resulted in error".to_string(),
                    )
                }
                AuthError::Signing(msg) => {
                    tracing::error!("Token signing failed: {}", msg);
                    internal()
                }
            },

            // 404 for reads of a disabled wallet, 422 for every other rule
            AppError::Rejected {
                resource: Resource::Wallet,
                source: DomainError::WalletDisabled,
            } => (
                StatusCode::NOT_FOUND,
                Resource::Wallet.to_string(),
                DomainError::WalletDisabled.to_string(),
            ),
            AppError::Rejected { resource, source } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                resource.to_string(),
                source.to_string(),
            ),

            // 408 Request Timeout
            AppError::Cancelled => (
                StatusCode::REQUEST_TIMEOUT,
                "cancelled".to_string(),
                "The request was cancelled".to_string(),
            ),

            // 500 Internal Server Error
            AppError::Store(e) => {
                tracing::error!("Store error: {:?}", e);
                internal()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                internal()
            }
        };

        let body = ErrorResponse {
            error_list: vec![ErrorItem {
                error_name: name,
                error_description: description,
            }],
            code: status.as_u16(),
        };

        (status, Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, String, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        INTERNAL_NAME.to_string(),
        INTERNAL_DESCRIPTION.to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_error_envelope() {
        let (status, body) =
            render(AppError::InvalidRequest("Params reference_id empty".to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 400);
        assert_eq!(body["error_list"][0]["error_name"], "Request invalid");
        assert_eq!(body["error_list"][0]["error_description"], "Params reference_id empty");
    }

    #[tokio::test]
    async fn test_business_rule_names_resource() {
        let (status, body) = render(AppError::rejected(
            Resource::Withdrawal,
            DomainError::insufficient_balance(1000.into(), 600.into()),
        ))
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error_list"][0]["error_name"], "Withdrawal");
        assert_eq!(body["error_list"][0]["error_description"], "Wallet balance not enough");
    }

    #[tokio::test]
    async fn test_disabled_wallet_read_is_not_found() {
        let (status, _) =
            render(AppError::rejected(Resource::Wallet, DomainError::WalletDisabled)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) =
            render(AppError::rejected(Resource::Deposit, DomainError::WalletDisabled)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_auth_errors() {
        let (status, body) = render(AuthError::InvalidSignature.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error_list"][0]["error_name"], "Unauthorized user");

        let (status, body) = render(AuthError::Expired.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_list"][0]["error_name"], "bad_request");

        let (status, body) = render(AuthError::MissingToken.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_list"][0]["error_description"], "Header Authorization empty");
    }

    #[tokio::test]
    async fn test_store_error_does_not_leak() {
        let (status, body) =
            render(StoreError::InvalidData("wallet 42 has status 7".to_string()).into()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error_list"][0]["error_name"], "internal_server_error");
        assert!(!body.to_string().contains("status 7"));
    }
}
