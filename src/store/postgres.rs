//! PostgreSQL adapters
//!
//! A deposit or withdrawal reads the wallet with `SELECT ... FOR UPDATE`
//! inside the same transaction that inserts the record and writes the new
//! balance. Requests against one wallet queue on that row lock, and each one
//! computes from the balance the previous one committed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::{
    Amount, Balance, Deposit, DomainError, NewDeposit, NewWallet, NewWithdrawal,
    TransactionKind, TransactionStatus, Wallet, WalletStatus, Withdrawal,
};

use super::{AccountStore, StoreError, TransactionStore, WalletStore};

type WalletRow = (Uuid, String, i16, DateTime<Utc>, Decimal);
type TransactionRow = (Uuid, String, i16, DateTime<Utc>, Decimal, String);

// =========================================================================
// Accounts
// =========================================================================

/// Customer registry backed by the `accounts` table
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn account_exists(&self, customer_xid: &str) -> Result<bool, StoreError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM accounts WHERE id = $1)")
                .bind(customer_xid)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn create_account(&self, customer_xid: &str) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO accounts (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
            .bind(customer_xid)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// =========================================================================
// Wallets
// =========================================================================

/// Wallet persistence backed by the `wallets` table
#[derive(Debug, Clone)]
pub struct PgWalletStore {
    pool: PgPool,
}

impl PgWalletStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WalletStore for PgWalletStore {
    async fn find_wallet_by_owner(&self, customer_xid: &str) -> Result<Option<Wallet>, StoreError> {
        let row: Option<WalletRow> = sqlx::query_as(
            r#"
            SELECT id, owned_by, status, enabled_at, balance
            FROM wallets
            WHERE owned_by = $1
            "#,
        )
        .bind(customer_xid)
        .fetch_optional(&self.pool)
        .await?;

        row.map(wallet_from_row).transpose()
    }

    async fn create_wallet(&self, wallet: NewWallet) -> Result<Wallet, StoreError> {
        let owner = wallet.owned_by.clone();

        let row: WalletRow = sqlx::query_as(
            r#"
            INSERT INTO wallets (owned_by, status, enabled_at, balance)
            VALUES ($1, $2, $3, $4)
            RETURNING id, owned_by, status, enabled_at, balance
            "#,
        )
        .bind(&wallet.owned_by)
        .bind(wallet.status.code())
        .bind(wallet.enabled_at)
        .bind(wallet.balance.value())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::WalletExists(owner)
            } else {
                StoreError::Database(e)
            }
        })?;

        wallet_from_row(row)
    }

    async fn transition_status(
        &self,
        wallet: &Wallet,
        from: WalletStatus,
    ) -> Result<Wallet, StoreError> {
        let row: Option<WalletRow> = sqlx::query_as(
            r#"
            UPDATE wallets
            SET status = $1
            WHERE id = $2 AND status = $3
            RETURNING id, owned_by, status, enabled_at, balance
            "#,
        )
        .bind(wallet.status.code())
        .bind(wallet.id)
        .bind(from.code())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => wallet_from_row(row),
            None => Err(StoreError::StatusConflict {
                wallet_id: wallet.id,
            }),
        }
    }
}

// =========================================================================
// Transactions
// =========================================================================

/// Deposit and withdrawal persistence
#[derive(Debug, Clone)]
pub struct PgTransactionStore {
    pool: PgPool,
}

/// Column layout of one transaction table
struct TableSpec {
    select_by_reference: &'static str,
    insert: &'static str,
}

impl TableSpec {
    fn of(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Deposit => TableSpec {
                select_by_reference: r#"
                    SELECT id, deposited_by, status, deposited_at, amount, reference_id
                    FROM deposits
                    WHERE reference_id = $1
                "#,
                insert: r#"
                    INSERT INTO deposits (deposited_by, status, deposited_at, amount, reference_id)
                    VALUES ($1, $2, $3, $4, $5)
                    RETURNING id
                "#,
            },
            TransactionKind::Withdrawal => TableSpec {
                select_by_reference: r#"
                    SELECT id, withdrawn_by, status, withdrawn_at, amount, reference_id
                    FROM withdrawals
                    WHERE reference_id = $1
                "#,
                insert: r#"
                    INSERT INTO withdrawals (withdrawn_by, status, withdrawn_at, amount, reference_id)
                    VALUES ($1, $2, $3, $4, $5)
                    RETURNING id
                "#,
            },
        }
    }
}

/// Column values of a record about to be inserted
struct InsertRecord<'a> {
    owner: &'a str,
    status: TransactionStatus,
    at: DateTime<Utc>,
    amount: Amount,
    reference_id: &'a str,
}

impl PgTransactionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by_reference(
        &self,
        kind: TransactionKind,
        reference_id: &str,
    ) -> Result<Option<TransactionRow>, StoreError> {
        let row: Option<TransactionRow> = sqlx::query_as(TableSpec::of(kind).select_by_reference)
            .bind(reference_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Lock the owner's wallet, apply the movement to the locked row, insert
    /// the record and write the balance, all in one transaction.
    /// Any early return drops `tx`, which rolls it back.
    async fn commit_movement(
        &self,
        kind: TransactionKind,
        record: InsertRecord<'_>,
    ) -> Result<Uuid, StoreError> {
        let mut tx = self.pool.begin().await?;

        let wallet = lock_wallet(&mut tx, record.owner)
            .await?
            .ok_or(StoreError::Rejected(DomainError::NotEnabled))?;
        let new_balance = kind.apply(&wallet, &record.amount)?;

        let id: Uuid = sqlx::query_scalar(TableSpec::of(kind).insert)
            .bind(record.owner)
            .bind(record.status.code())
            .bind(record.at)
            .bind(record.amount.value())
            .bind(record.reference_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::DuplicateReference(record.reference_id.to_string())
                } else {
                    StoreError::Database(e)
                }
            })?;

        sqlx::query("UPDATE wallets SET balance = $1 WHERE id = $2")
            .bind(new_balance.value())
            .bind(wallet.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(
            kind = kind.as_str(),
            transaction_id = %id,
            wallet_id = %wallet.id,
            balance = %new_balance,
            "Transaction committed"
        );

        Ok(id)
    }
}

#[async_trait]
impl TransactionStore for PgTransactionStore {
    async fn find_deposit_by_reference(
        &self,
        reference_id: &str,
    ) -> Result<Option<Deposit>, StoreError> {
        self.find_by_reference(TransactionKind::Deposit, reference_id)
            .await?
            .map(|(id, owner, status, at, amount, reference_id)| {
                Ok(Deposit {
                    id,
                    deposited_by: owner,
                    status: status_from_code(status)?,
                    deposited_at: at,
                    amount: amount_from_column(amount)?,
                    reference_id,
                })
            })
            .transpose()
    }

    async fn find_withdrawal_by_reference(
        &self,
        reference_id: &str,
    ) -> Result<Option<Withdrawal>, StoreError> {
        self.find_by_reference(TransactionKind::Withdrawal, reference_id)
            .await?
            .map(|(id, owner, status, at, amount, reference_id)| {
                Ok(Withdrawal {
                    id,
                    withdrawn_by: owner,
                    status: status_from_code(status)?,
                    withdrawn_at: at,
                    amount: amount_from_column(amount)?,
                    reference_id,
                })
            })
            .transpose()
    }

    async fn create_deposit(&self, deposit: NewDeposit) -> Result<Deposit, StoreError> {
        let record = InsertRecord {
            owner: &deposit.deposited_by,
            status: deposit.status,
            at: deposit.deposited_at,
            amount: deposit.amount,
            reference_id: &deposit.reference_id,
        };
        let id = self.commit_movement(TransactionKind::Deposit, record).await?;

        Ok(deposit.into_deposit(id))
    }

    async fn create_withdrawal(&self, withdrawal: NewWithdrawal) -> Result<Withdrawal, StoreError> {
        let record = InsertRecord {
            owner: &withdrawal.withdrawn_by,
            status: withdrawal.status,
            at: withdrawal.withdrawn_at,
            amount: withdrawal.amount,
            reference_id: &withdrawal.reference_id,
        };
        let id = self
            .commit_movement(TransactionKind::Withdrawal, record)
            .await?;

        Ok(withdrawal.into_withdrawal(id))
    }
}

// =========================================================================
// Helpers
// =========================================================================

/// Read the owner's wallet and hold its row lock until `tx` ends
async fn lock_wallet(
    tx: &mut Transaction<'_, Postgres>,
    owner: &str,
) -> Result<Option<Wallet>, StoreError> {
    let row: Option<WalletRow> = sqlx::query_as(
        r#"
        SELECT id, owned_by, status, enabled_at, balance
        FROM wallets
        WHERE owned_by = $1
        FOR UPDATE
        "#,
    )
    .bind(owner)
    .fetch_optional(&mut **tx)
    .await?;

    row.map(wallet_from_row).transpose()
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

fn wallet_from_row((id, owned_by, status, enabled_at, balance): WalletRow) -> Result<Wallet, StoreError> {
    let status = WalletStatus::from_code(status)
        .ok_or_else(|| StoreError::InvalidData(format!("wallet {} has status {}", id, status)))?;
    let balance = Balance::new(balance)
        .map_err(|e| StoreError::InvalidData(format!("wallet {}: {}", id, e)))?;

    Ok(Wallet {
        id,
        owned_by,
        status,
        enabled_at,
        balance,
    })
}

fn status_from_code(code: i16) -> Result<TransactionStatus, StoreError> {
    TransactionStatus::from_code(code)
        .ok_or_else(|| StoreError::InvalidData(format!("unknown transaction status {}", code)))
}

fn amount_from_column(amount: Decimal) -> Result<Amount, StoreError> {
    Amount::new(amount).map_err(|e| StoreError::InvalidData(e.to_string()))
}
