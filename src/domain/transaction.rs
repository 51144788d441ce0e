//! Transaction records
//!
//! Deposits and withdrawals are created exactly once per accepted request
//! and never change afterwards. Failed requests never produce a record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Amount, Balance, DomainError, Wallet};

/// Status of a stored transaction record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Success,
}

impl TransactionStatus {
    /// Numeric code stored in the `status` column
    pub fn code(&self) -> i16 {
        match self {
            TransactionStatus::Success => 1,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            1 => Some(TransactionStatus::Success),
            _ => None,
        }
    }

    /// Display label used in API responses
    pub fn label(&self) -> &'static str {
        match self {
            TransactionStatus::Success => "success",
        }
    }
}

/// Money movement direction, used by store adapters to pick the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
        }
    }

    /// Balance `wallet` ends up with once this movement of `amount` lands
    pub fn apply(&self, wallet: &Wallet, amount: &Amount) -> Result<Balance, DomainError> {
        match self {
            TransactionKind::Deposit => wallet.deposit(amount),
            TransactionKind::Withdrawal => wallet.withdraw(amount),
        }
    }
}

/// A persisted deposit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deposit {
    pub id: Uuid,
    pub deposited_by: String,
    pub status: TransactionStatus,
    pub deposited_at: DateTime<Utc>,
    pub amount: Amount,
    pub reference_id: String,
}

/// A deposit that has not been persisted yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewDeposit {
    pub deposited_by: String,
    pub status: TransactionStatus,
    pub deposited_at: DateTime<Utc>,
    pub amount: Amount,
    pub reference_id: String,
}

impl NewDeposit {
    pub fn success(customer_xid: &str, reference_id: &str, amount: Amount) -> Self {
        Self {
            deposited_by: customer_xid.to_string(),
            status: TransactionStatus::Success,
            deposited_at: Utc::now(),
            amount,
            reference_id: reference_id.to_string(),
        }
    }

    /// Attach the identifier assigned by the store
    pub fn into_deposit(self, id: Uuid) -> Deposit {
        Deposit {
            id,
            deposited_by: self.deposited_by,
            status: self.status,
            deposited_at: self.deposited_at,
            amount: self.amount,
            reference_id: self.reference_id,
        }
    }
}

/// A persisted withdrawal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub id: Uuid,
    pub withdrawn_by: String,
    pub status: TransactionStatus,
    pub withdrawn_at: DateTime<Utc>,
    pub amount: Amount,
    pub reference_id: String,
}

/// A withdrawal that has not been persisted yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewWithdrawal {
    pub withdrawn_by: String,
    pub status: TransactionStatus,
    pub withdrawn_at: DateTime<Utc>,
    pub amount: Amount,
    pub reference_id: String,
}

impl NewWithdrawal {
    pub fn success(customer_xid: &str, reference_id: &str, amount: Amount) -> Self {
        Self {
            withdrawn_by: customer_xid.to_string(),
            status: TransactionStatus::Success,
            withdrawn_at: Utc::now(),
            amount,
            reference_id: reference_id.to_string(),
        }
    }

    pub fn into_withdrawal(self, id: Uuid) -> Withdrawal {
        Withdrawal {
            id,
            withdrawn_by: self.withdrawn_by,
            status: self.status,
            withdrawn_at: self.withdrawn_at,
            amount: self.amount,
            reference_id: self.reference_id,
        }
    }
}
