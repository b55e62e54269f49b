//! Repository for the `affiliates` and `affiliate_payouts` tables.

use chrono::NaiveDate;
use msgdesk_core::affiliate::commission_cents;
use msgdesk_core::types::{Cents, DbId};
use sqlx::PgPool;

use crate::models::affiliate::{
    Affiliate, AffiliatePayout, CommissionSummary, CreateAffiliate, UpdateAffiliate,
};

const COLUMNS: &str =
    "id, name, email, referral_code, commission_bps, is_active, created_at, updated_at";

const PAYOUT_COLUMNS: &str = "id, affiliate_id, amount_cents, period_start, period_end, status, \
    notes, paid_at, created_at, updated_at";

/// Provides CRUD operations for affiliates, their payouts, and commission
/// reporting.
pub struct AffiliateRepo;

impl AffiliateRepo {
    /// Insert an affiliate. `referral_code` must already be resolved (given
    /// or generated) by the caller.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAffiliate,
        referral_code: &str,
    ) -> Result<Affiliate, sqlx::Error> {
        let query = format!(
            "INSERT INTO affiliates (name, email, referral_code, commission_bps)
             VALUES ($1, $2, $3, COALESCE($4, 1000))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Affiliate>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(referral_code)
            .bind(input.commission_bps)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Affiliate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM affiliates WHERE id = $1");
        sqlx::query_as::<_, Affiliate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Affiliate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM affiliates ORDER BY name ASC");
        sqlx::query_as::<_, Affiliate>(&query).fetch_all(pool).await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAffiliate,
    ) -> Result<Option<Affiliate>, sqlx::Error> {
        let query = format!(
            "UPDATE affiliates SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                commission_bps = COALESCE($4, commission_bps),
                is_active = COALESCE($5, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Affiliate>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(input.commission_bps)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Delete an affiliate. Referred clients keep existing with no affiliate.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM affiliates WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Commission earned on top-ups by referred clients between `from` and
    /// `to`, both inclusive. Campaign refunds are credits too but carry a
    /// `campaign_id` and earn nothing.
    pub async fn commission(
        pool: &PgPool,
        affiliate: &Affiliate,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<CommissionSummary, sqlx::Error> {
        let (referred_clients, referred_credits_cents): (i64, Cents) = sqlx::query_as(
            "SELECT
                (SELECT COUNT(*) FROM clients WHERE affiliate_id = $1),
                COALESCE((
                    SELECT SUM(t.amount_cents)
                    FROM wallet_transactions t
                    JOIN clients c ON c.id = t.client_id
                    WHERE c.affiliate_id = $1
                      AND t.kind = 'credit'
                      AND t.campaign_id IS NULL
                      AND t.created_at >= $2::date
                      AND t.created_at < ($3::date + 1)
                ), 0)::BIGINT",
        )
        .bind(affiliate.id)
        .bind(from)
        .bind(to)
        .fetch_one(pool)
        .await?;

        Ok(CommissionSummary {
            affiliate_id: affiliate.id,
            period_start: from,
            period_end: to,
            referred_clients,
            referred_credits_cents,
            commission_bps: affiliate.commission_bps,
            commission_cents: commission_cents(referred_credits_cents, affiliate.commission_bps),
        })
    }

    // -----------------------------------------------------------------------
    // Payouts
    // -----------------------------------------------------------------------

    pub async fn create_payout(
        pool: &PgPool,
        affiliate_id: DbId,
        period_start: NaiveDate,
        period_end: NaiveDate,
        amount_cents: Cents,
        notes: Option<&str>,
    ) -> Result<AffiliatePayout, sqlx::Error> {
        let query = format!(
            "INSERT INTO affiliate_payouts (affiliate_id, amount_cents, period_start, period_end, notes)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {PAYOUT_COLUMNS}"
        );
        sqlx::query_as::<_, AffiliatePayout>(&query)
            .bind(affiliate_id)
            .bind(amount_cents)
            .bind(period_start)
            .bind(period_end)
            .bind(notes)
            .fetch_one(pool)
            .await
    }

    pub async fn list_payouts(
        pool: &PgPool,
        affiliate_id: DbId,
    ) -> Result<Vec<AffiliatePayout>, sqlx::Error> {
        let query = format!(
            "SELECT {PAYOUT_COLUMNS} FROM affiliate_payouts
             WHERE affiliate_id = $1
             ORDER BY period_start DESC, id DESC"
        );
        sqlx::query_as::<_, AffiliatePayout>(&query)
            .bind(affiliate_id)
            .fetch_all(pool)
            .await
    }

    /// Mark a pending payout as paid. Returns `None` if the payout does not
    /// exist for this affiliate or is already paid.
    pub async fn mark_payout_paid(
        pool: &PgPool,
        affiliate_id: DbId,
        payout_id: DbId,
    ) -> Result<Option<AffiliatePayout>, sqlx::Error> {
        let query = format!(
            "UPDATE affiliate_payouts SET status = 'paid', paid_at = NOW()
             WHERE id = $1 AND affiliate_id = $2 AND status = 'pending'
             RETURNING {PAYOUT_COLUMNS}"
        );
        sqlx::query_as::<_, AffiliatePayout>(&query)
            .bind(payout_id)
            .bind(affiliate_id)
            .fetch_optional(pool)
            .await
    }
}
