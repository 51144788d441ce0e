//! Wallet
//!
//! One wallet per customer. The wallet owns the enable/disable state machine
//! and the balance arithmetic for deposits and withdrawals; persistence is
//! left to the store adapters.
//!
//! ```text
//! NonExistent --enable--> Enabled --disable--> Disabled
//!                            ^                     |
//!                            +-------enable--------+
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Amount, Balance, DomainError};

/// Wallet status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletStatus {
    Enabled,
    Disabled,
}

impl WalletStatus {
    /// Numeric code stored in the `wallets.status` column
    pub fn code(&self) -> i16 {
        match self {
            WalletStatus::Enabled => 1,
            WalletStatus::Disabled => 2,
        }
    }

    /// Decode the numeric column value
    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            1 => Some(WalletStatus::Enabled),
            2 => Some(WalletStatus::Disabled),
            _ => None,
        }
    }

    /// Display label used in API responses
    pub fn label(&self) -> &'static str {
        match self {
            WalletStatus::Enabled => "enabled",
            WalletStatus::Disabled => "disabled",
        }
    }
}

impl std::fmt::Display for WalletStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A persisted wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    /// Identifier assigned by the store
    pub id: Uuid,

    /// Owning customer (unique across wallets)
    pub owned_by: String,

    pub status: WalletStatus,

    pub enabled_at: DateTime<Utc>,

    pub balance: Balance,
}

/// A wallet that has not been persisted yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewWallet {
    pub owned_by: String,
    pub status: WalletStatus,
    pub enabled_at: DateTime<Utc>,
    pub balance: Balance,
}

impl NewWallet {
    /// First enable for a customer: enabled, empty, enabled now
    pub fn enabled_for(customer_xid: impl Into<String>) -> Self {
        Self {
            owned_by: customer_xid.into(),
            status: WalletStatus::Enabled,
            enabled_at: Utc::now(),
            balance: Balance::zero(),
        }
    }
}

impl Wallet {
    /// Enabled -> error, Disabled -> Enabled
    pub fn enable(&self) -> Result<Wallet, DomainError> {
        if self.status == WalletStatus::Enabled {
            return Err(DomainError::AlreadyEnabled);
        }

        Ok(Wallet {
            status: WalletStatus::Enabled,
            ..self.clone()
        })
    }

    /// Disabled -> error, Enabled -> Disabled
    pub fn disable(&self) -> Result<Wallet, DomainError> {
        if self.status == WalletStatus::Disabled {
            return Err(DomainError::AlreadyDisabled);
        }

        Ok(Wallet {
            status: WalletStatus::Disabled,
            ..self.clone()
        })
    }

    /// Money movement and balance reads require an enabled wallet
    pub fn ensure_enabled(&self) -> Result<(), DomainError> {
        match self.status {
            WalletStatus::Enabled => Ok(()),
            WalletStatus::Disabled => Err(DomainError::WalletDisabled),
        }
    }

    /// Balance after depositing `amount`
    pub fn deposit(&self, amount: &Amount) -> Result<Balance, DomainError> {
        self.ensure_enabled()?;
        Ok(self.balance.credit(amount)?)
    }

    /// Balance after withdrawing `amount`
    pub fn withdraw(&self, amount: &Amount) -> Result<Balance, DomainError> {
        self.ensure_enabled()?;

        if !self.balance.is_sufficient_for(amount) {
            return Err(DomainError::insufficient_balance(
                amount.value(),
                self.balance.value(),
            ));
        }

        Ok(self.balance.debit(amount)?)
    }

    pub fn is_enabled(&self) -> bool {
        self.status == WalletStatus::Enabled
    }
}
