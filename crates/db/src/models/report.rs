//! Read-only aggregate rows for reports and the dashboard.

use chrono::NaiveDate;
use msgdesk_core::types::{Cents, DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Per-campaign delivery totals.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CampaignReportRow {
    pub id: DbId,
    pub name: String,
    pub channel: String,
    pub status: String,
    pub audience_count: i64,
    pub estimated_cost_cents: Option<Cents>,
    pub launched_at: Option<Timestamp>,
    pub queued: i64,
    pub sent: i64,
    pub delivered: i64,
    pub read: i64,
    pub failed: i64,
}

/// Recipient count for one delivery status.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

/// Wallet debits grouped by day.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DailySpend {
    pub day: NaiveDate,
    pub debit_cents: Cents,
    pub credit_cents: Cents,
}

/// Headline numbers for a client's dashboard.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ClientDashboardStats {
    pub contacts: i64,
    pub campaigns: i64,
    pub active_campaigns: i64,
    pub messages_sent: i64,
    pub messages_delivered: i64,
    pub balance_cents: Cents,
    pub bots: i64,
}

/// Headline numbers for the platform (super admin) dashboard.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PlatformDashboardStats {
    pub clients: i64,
    pub active_clients: i64,
    pub campaigns: i64,
    pub messages_sent: i64,
    pub total_balance_cents: Cents,
    pub affiliates: i64,
}
