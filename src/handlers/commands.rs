//! Command definitions
//!
//! Commands represent intentions to change the system state. The customer
//! identifier always comes from the verified token, never from the body.

use serde::{Deserialize, Serialize};

use crate::domain::Amount;

// =========================================================================
// Account initialization
// =========================================================================

/// Command to register a customer and obtain a token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitAccountCommand {
    pub customer_xid: String,
}

impl InitAccountCommand {
    pub fn new(customer_xid: impl Into<String>) -> Self {
        Self {
            customer_xid: customer_xid.into(),
        }
    }
}

/// Result of account initialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitAccountResult {
    pub token: String,
}

// =========================================================================
// Money movement
// =========================================================================

/// Command to credit the caller's wallet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositCommand {
    pub customer_xid: String,
    /// Caller-supplied idempotency reference
    pub reference_id: String,
    pub amount: Amount,
}

impl DepositCommand {
    pub fn new(customer_xid: impl Into<String>, reference_id: impl Into<String>, amount: Amount) -> Self {
        Self {
            customer_xid: customer_xid.into(),
            reference_id: reference_id.into(),
            amount,
        }
    }
}

/// Command to debit the caller's wallet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalCommand {
    pub customer_xid: String,
    pub reference_id: String,
    pub amount: Amount,
}

impl WithdrawalCommand {
    pub fn new(customer_xid: impl Into<String>, reference_id: impl Into<String>, amount: Amount) -> Self {
        Self {
            customer_xid: customer_xid.into(),
            reference_id: reference_id.into(),
            amount,
        }
    }
}
