//! API Middleware
//!
//! Token authentication and request logging.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::auth::{AuthError, TokenService};
use crate::domain::OperationContext;
use crate::error::AppError;

use super::AppState;

/// Header carrying the caller's correlation id
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-Id";

/// Correlation id resolved for the current request
#[derive(Debug, Clone, Copy)]
pub struct CorrelationId(pub Uuid);

fn correlation_id_from(headers: &HeaderMap) -> Uuid {
    headers
        .get(CORRELATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s.trim()).ok())
        .unwrap_or_else(Uuid::new_v4)
}

// =========================================================================
// Token authentication
// =========================================================================

/// Verify `Authorization: Token <jwt>` and attach the caller's context.
///
/// The context carries a cancellation token that fires if the request is
/// dropped before the handler finishes.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let claims = TokenService::token_from_header(header)
        .and_then(|token| state.tokens.verify(token))
        .map_err(|e: AuthError| {
            tracing::warn!(error = %e, uri = %request.uri(), "Authentication failed");
            AppError::from(e).into_response()
        })?;

    let correlation_id = match request.extensions().get::<CorrelationId>() {
        Some(CorrelationId(id)) => *id,
        None => correlation_id_from(request.headers()),
    };

    let cancellation = CancellationToken::new();
    let context = OperationContext::new()
        .with_customer(claims.customer_xid)
        .with_correlation_id(correlation_id)
        .with_cancellation(cancellation.child_token());

    request.extensions_mut().insert(context);

    let guard = cancellation.drop_guard();
    let response = next.run(request).await;
    guard.disarm();

    Ok(response)
}

// =========================================================================
// mask_headers_for_logging
// =========================================================================

/// Headers that should be masked in logs
const SENSITIVE_HEADERS: &[&str] = &["authorization", "cookie", "set-cookie"];

/// Mask sensitive headers for logging
pub fn mask_headers_for_logging(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let masked_value = if SENSITIVE_HEADERS.contains(&name.as_str()) {
                "[REDACTED]".to_string()
            } else {
                value.to_str().unwrap_or("[invalid utf8]").to_string()
            };
            (name.to_string(), masked_value)
        })
        .collect()
}

// =========================================================================
// Request logging
// =========================================================================

/// Request logging middleware
pub async fn logging_middleware(mut request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let headers = mask_headers_for_logging(request.headers());

    let correlation_id = correlation_id_from(request.headers());
    request.extensions_mut().insert(CorrelationId(correlation_id));

    let start = std::time::Instant::now();

    tracing::info!(
        method = %method,
        uri = %uri,
        correlation_id = %correlation_id,
        headers = ?headers,
        "Incoming request"
    );

    let response = next.run(request).await;

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %response.status(),
        duration_ms = %start.elapsed().as_millis(),
        correlation_id = %correlation_id,
        "Request completed"
    );

    response
}
