//! Aggregate queries behind the reports and dashboard screens.

use chrono::NaiveDate;
use msgdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::report::{
    CampaignReportRow, ClientDashboardStats, DailySpend, PlatformDashboardStats, StatusCount,
};

/// Read-only reporting queries.
pub struct ReportRepo;

impl ReportRepo {
    /// Delivery totals per campaign for a client, newest first.
    pub async fn campaign_summaries(
        pool: &PgPool,
        client_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CampaignReportRow>, sqlx::Error> {
        sqlx::query_as::<_, CampaignReportRow>(
            "SELECT c.id, c.name, c.channel, c.status, c.audience_count,
                    c.estimated_cost_cents, c.launched_at,
                    COUNT(r.id) FILTER (WHERE r.status = 'queued') AS queued,
                    COUNT(r.id) FILTER (WHERE r.status = 'sent') AS sent,
                    COUNT(r.id) FILTER (WHERE r.status = 'delivered') AS delivered,
                    COUNT(r.id) FILTER (WHERE r.status = 'read') AS read,
                    COUNT(r.id) FILTER (WHERE r.status = 'failed') AS failed
             FROM campaigns c
             LEFT JOIN campaign_recipients r ON r.campaign_id = c.id
             WHERE c.client_id = $1
             GROUP BY c.id
             ORDER BY c.created_at DESC, c.id DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(client_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Recipient counts by status for one campaign.
    pub async fn delivery_breakdown(
        pool: &PgPool,
        campaign_id: DbId,
    ) -> Result<Vec<StatusCount>, sqlx::Error> {
        sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count
             FROM campaign_recipients
             WHERE campaign_id = $1
             GROUP BY status
             ORDER BY status",
        )
        .bind(campaign_id)
        .fetch_all(pool)
        .await
    }

    /// Daily debits and credits between two dates, inclusive.
    pub async fn daily_spend(
        pool: &PgPool,
        client_id: DbId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailySpend>, sqlx::Error> {
        sqlx::query_as::<_, DailySpend>(
            "SELECT (created_at AT TIME ZONE 'UTC')::date AS day,
                    COALESCE(SUM(amount_cents) FILTER (WHERE kind = 'debit'), 0)::BIGINT AS debit_cents,
                    COALESCE(SUM(amount_cents) FILTER (WHERE kind = 'credit'), 0)::BIGINT AS credit_cents
             FROM wallet_transactions
             WHERE client_id = $1
               AND created_at >= $2::date
               AND created_at < ($3::date + 1)
             GROUP BY day
             ORDER BY day",
        )
        .bind(client_id)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
    }

    pub async fn client_dashboard(
        pool: &PgPool,
        client_id: DbId,
    ) -> Result<ClientDashboardStats, sqlx::Error> {
        sqlx::query_as::<_, ClientDashboardStats>(
            "SELECT
                (SELECT COUNT(*) FROM contacts WHERE client_id = $1) AS contacts,
                (SELECT COUNT(*) FROM campaigns WHERE client_id = $1) AS campaigns,
                (SELECT COUNT(*) FROM campaigns
                  WHERE client_id = $1 AND status IN ('scheduled', 'running')) AS active_campaigns,
                (SELECT COUNT(*) FROM campaign_recipients r
                  JOIN campaigns c ON c.id = r.campaign_id
                  WHERE c.client_id = $1 AND r.status IN ('sent', 'delivered', 'read')) AS messages_sent,
                (SELECT COUNT(*) FROM campaign_recipients r
                  JOIN campaigns c ON c.id = r.campaign_id
                  WHERE c.client_id = $1 AND r.status IN ('delivered', 'read')) AS messages_delivered,
                COALESCE((SELECT balance_cents FROM wallets WHERE client_id = $1), 0) AS balance_cents,
                (SELECT COUNT(*) FROM bots WHERE client_id = $1) AS bots",
        )
        .bind(client_id)
        .fetch_one(pool)
        .await
    }

    pub async fn platform_dashboard(pool: &PgPool) -> Result<PlatformDashboardStats, sqlx::Error> {
        sqlx::query_as::<_, PlatformDashboardStats>(
            "SELECT
                (SELECT COUNT(*) FROM clients) AS clients,
                (SELECT COUNT(*) FROM clients WHERE is_active) AS active_clients,
                (SELECT COUNT(*) FROM campaigns) AS campaigns,
                (SELECT COUNT(*) FROM campaign_recipients
                  WHERE status IN ('sent', 'delivered', 'read')) AS messages_sent,
                COALESCE((SELECT SUM(balance_cents) FROM wallets), 0)::BIGINT AS total_balance_cents,
                (SELECT COUNT(*) FROM affiliates) AS affiliates",
        )
        .fetch_one(pool)
        .await
    }
}
