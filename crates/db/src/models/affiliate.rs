//! Affiliate and payout models.

use chrono::NaiveDate;
use msgdesk_core::types::{Cents, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An affiliate row from the `affiliates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Affiliate {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub referral_code: String,
    pub commission_bps: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an affiliate. A referral code is generated when omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAffiliate {
    pub name: String,
    pub email: String,
    pub referral_code: Option<String>,
    pub commission_bps: Option<i32>,
}

/// DTO for updating an affiliate. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAffiliate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub commission_bps: Option<i32>,
    pub is_active: Option<bool>,
}

/// A payout row from the `affiliate_payouts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AffiliatePayout {
    pub id: DbId,
    pub affiliate_id: DbId,
    pub amount_cents: Cents,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    /// `pending` or `paid`.
    pub status: String,
    pub notes: Option<String>,
    pub paid_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording a payout. When `amount_cents` is omitted the commission
/// earned in the period is used.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePayout {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub amount_cents: Option<Cents>,
    pub notes: Option<String>,
}

/// Commission earned by an affiliate over a period.
#[derive(Debug, Clone, Serialize)]
pub struct CommissionSummary {
    pub affiliate_id: DbId,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub referred_clients: i64,
    /// Top-ups made by referred clients in the period.
    pub referred_credits_cents: Cents,
    pub commission_bps: i32,
    pub commission_cents: Cents,
}
