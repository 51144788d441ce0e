//! Per-request operation context
//!
//! Carries who is calling, the correlation id used in logs, and the
//! cancellation signal every engine checks before touching a store.

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct OperationContext {
    /// Customer resolved from the bearer token
    pub customer_xid: Option<String>,

    pub correlation_id: Option<Uuid>,

    /// Cancelled when the caller goes away
    cancellation: CancellationToken,
}

/// The operation was cancelled before it touched the store
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Operation cancelled")]
pub struct Cancelled;

impl OperationContext {
    /// Anonymous context with its own, never-cancelled token
    pub fn new() -> Self {
        Self {
            customer_xid: None,
            correlation_id: None,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_customer(mut self, customer_xid: impl Into<String>) -> Self {
        self.customer_xid = Some(customer_xid.into());
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    /// Tie this context to a request-scoped token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Err once the operation has been cancelled
    pub fn ensure_active(&self) -> Result<(), Cancelled> {
        if self.cancellation.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

impl Default for OperationContext {
    fn default() -> Self {
        Self::new()
    }
}
