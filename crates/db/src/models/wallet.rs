//! Wallet and wallet transaction models.

use msgdesk_core::types::{Cents, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A wallet row from the `wallets` table. One per client.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Wallet {
    pub id: DbId,
    pub client_id: DbId,
    pub balance_cents: Cents,
    pub currency: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A ledger row from the `wallet_transactions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WalletTransaction {
    pub id: DbId,
    pub client_id: DbId,
    /// `credit` or `debit`.
    pub kind: String,
    pub amount_cents: Cents,
    pub balance_after_cents: Cents,
    pub description: Option<String>,
    pub campaign_id: Option<DbId>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
}

/// Request body for a top-up.
#[derive(Debug, Clone, Deserialize)]
pub struct CreditWallet {
    pub amount_cents: Cents,
    pub description: Option<String>,
}
