//! Repository for the `wallets` and `wallet_transactions` tables.
//!
//! Every balance change takes a row lock on the wallet, applies the change
//! with [`msgdesk_core::wallet::apply`], and writes the ledger row in the
//! same transaction.

use msgdesk_core::error::CoreError;
use msgdesk_core::types::{Cents, DbId};
use msgdesk_core::wallet::{apply, TransactionKind};
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::RepoError;
use crate::models::wallet::{Wallet, WalletTransaction};

const COLUMNS: &str = "id, client_id, balance_cents, currency, created_at, updated_at";

const TX_COLUMNS: &str = "id, client_id, kind, amount_cents, balance_after_cents, description, \
    campaign_id, created_by, created_at";

/// A balance change to record.
#[derive(Debug, Clone)]
pub struct LedgerEntry<'a> {
    pub kind: TransactionKind,
    pub amount_cents: Cents,
    pub description: Option<&'a str>,
    pub campaign_id: Option<DbId>,
    pub created_by: Option<DbId>,
}

/// Provides balance and ledger operations for client wallets.
pub struct WalletRepo;

impl WalletRepo {
    pub async fn find_by_client(
        pool: &PgPool,
        client_id: DbId,
    ) -> Result<Option<Wallet>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM wallets WHERE client_id = $1");
        sqlx::query_as::<_, Wallet>(&query)
            .bind(client_id)
            .fetch_optional(pool)
            .await
    }

    /// Ledger rows for a client, newest first.
    pub async fn list_transactions(
        pool: &PgPool,
        client_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WalletTransaction>, sqlx::Error> {
        let query = format!(
            "SELECT {TX_COLUMNS} FROM wallet_transactions
             WHERE client_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, WalletTransaction>(&query)
            .bind(client_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Apply `entry` in its own transaction.
    pub async fn record(
        pool: &PgPool,
        client_id: DbId,
        entry: &LedgerEntry<'_>,
    ) -> Result<WalletTransaction, RepoError> {
        let mut tx = pool.begin().await?;
        let row = Self::record_in_tx(&mut tx, client_id, entry).await?;
        tx.commit().await?;
        Ok(row)
    }

    /// Apply `entry` inside an existing transaction.
    ///
    /// Fails with [`CoreError::InsufficientFunds`] when a debit exceeds the
    /// balance, and with [`CoreError::NotFound`] when the client has no wallet.
    pub async fn record_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        client_id: DbId,
        entry: &LedgerEntry<'_>,
    ) -> Result<WalletTransaction, RepoError> {
        let balance: Option<Cents> = sqlx::query_scalar(
            "SELECT balance_cents FROM wallets WHERE client_id = $1 FOR UPDATE",
        )
        .bind(client_id)
        .fetch_optional(&mut **tx)
        .await?;
        let balance = balance.ok_or(CoreError::NotFound {
            entity: "Wallet",
            id: client_id,
        })?;

        let new_balance = apply(balance, entry.kind, entry.amount_cents)?;

        sqlx::query("UPDATE wallets SET balance_cents = $2 WHERE client_id = $1")
            .bind(client_id)
            .bind(new_balance)
            .execute(&mut **tx)
            .await?;

        let query = format!(
            "INSERT INTO wallet_transactions
                (client_id, kind, amount_cents, balance_after_cents, description, campaign_id, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {TX_COLUMNS}"
        );
        let row = sqlx::query_as::<_, WalletTransaction>(&query)
            .bind(client_id)
            .bind(entry.kind.as_str())
            .bind(entry.amount_cents)
            .bind(new_balance)
            .bind(entry.description)
            .bind(entry.campaign_id)
            .bind(entry.created_by)
            .fetch_one(&mut **tx)
            .await?;

        tracing::info!(
            client_id,
            kind = %entry.kind,
            amount_cents = entry.amount_cents,
            balance_after_cents = new_balance,
            "Wallet transaction recorded"
        );
        Ok(row)
    }
}
