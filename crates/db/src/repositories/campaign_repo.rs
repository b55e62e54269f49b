//! Repository for `campaigns`, `campaign_audience`, and `campaign_recipients`.
//!
//! Status changes lock the campaign row and check the transition with
//! [`CampaignStatus::ensure_transition`] inside the same transaction that
//! writes the change.

use msgdesk_core::campaign::{CampaignStatus, RecipientStatus};
use msgdesk_core::channels::Channel;
use msgdesk_core::error::CoreError;
use msgdesk_core::types::{Cents, DbId};
use msgdesk_core::wallet::TransactionKind;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::RepoError;
use crate::models::campaign::{
    Campaign, CampaignRecipient, CreateCampaign, LaunchPlan, UpdateCampaign,
};
use crate::models::contact::Contact;
use crate::repositories::wallet_repo::{LedgerEntry, WalletRepo};

const COLUMNS: &str = "id, client_id, name, channel, bot_id, template_id, body, variable_mapping, \
    status, audience_count, estimated_cost_cents, scheduled_at, launched_at, completed_at, \
    created_by, created_at, updated_at";

const RECIPIENT_COLUMNS: &str = "id, campaign_id, contact_id, phone, rendered_body, status, \
    error_message, status_updated_at, created_at";

/// Provides CRUD, audience, and lifecycle operations for campaigns.
pub struct CampaignRepo;

impl CampaignRepo {
    pub async fn create(
        pool: &PgPool,
        client_id: DbId,
        channel: Channel,
        created_by: DbId,
        input: &CreateCampaign,
    ) -> Result<Campaign, sqlx::Error> {
        let query = format!(
            "INSERT INTO campaigns
                (client_id, name, channel, bot_id, template_id, body, variable_mapping,
                 scheduled_at, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(client_id)
            .bind(input.name.trim())
            .bind(channel.as_str())
            .bind(input.bot_id)
            .bind(input.template_id)
            .bind(&input.body)
            .bind(Json(&input.variable_mapping))
            .bind(input.scheduled_at)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        client_id: DbId,
        id: DbId,
    ) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM campaigns WHERE id = $1 AND client_id = $2");
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .bind(client_id)
            .fetch_optional(pool)
            .await
    }

    /// List a client's campaigns, newest first, optionally by status.
    pub async fn list(
        pool: &PgPool,
        client_id: DbId,
        status: Option<CampaignStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Campaign>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM campaigns
             WHERE client_id = $1 AND ($2::text IS NULL OR status = $2)
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(client_id)
            .bind(status.map(CampaignStatus::as_str))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update a draft campaign. Returns `None` if the campaign does not exist
    /// or is no longer a draft.
    pub async fn update_draft(
        pool: &PgPool,
        client_id: DbId,
        id: DbId,
        input: &UpdateCampaign,
    ) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!(
            "UPDATE campaigns SET
                name = COALESCE($3, name),
                bot_id = COALESCE($4, bot_id),
                template_id = COALESCE($5, template_id),
                body = COALESCE($6, body),
                variable_mapping = COALESCE($7, variable_mapping),
                scheduled_at = CASE WHEN $9 THEN NULL ELSE COALESCE($8, scheduled_at) END
             WHERE id = $1 AND client_id = $2 AND status = 'draft'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .bind(client_id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(input.bot_id)
            .bind(input.template_id)
            .bind(&input.body)
            .bind(input.variable_mapping.as_ref().map(Json))
            .bind(input.scheduled_at)
            .bind(input.send_now)
            .fetch_optional(pool)
            .await
    }

    /// Delete a draft campaign. Returns `false` if it does not exist or is
    /// not a draft.
    pub async fn delete_draft(pool: &PgPool, client_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM campaigns WHERE id = $1 AND client_id = $2 AND status = 'draft'",
        )
        .bind(id)
        .bind(client_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Audience
    // -----------------------------------------------------------------------

    /// Replace a draft's audience with `contact_ids` and store the new count.
    ///
    /// Ids that are not the client's opted-in contacts are ignored. Returns
    /// the resulting audience count.
    pub async fn set_audience(
        pool: &PgPool,
        client_id: DbId,
        id: DbId,
        contact_ids: &[DbId],
    ) -> Result<i64, RepoError> {
        let mut tx = pool.begin().await?;

        let (status, _) = Self::lock(&mut tx, client_id, id).await?;
        if !status.is_editable() {
            return Err(CoreError::Conflict(format!(
                "Audience of a {status} campaign cannot be changed"
            ))
            .into());
        }

        sqlx::query("DELETE FROM campaign_audience WHERE campaign_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let inserted = sqlx::query(
            "INSERT INTO campaign_audience (campaign_id, contact_id)
             SELECT $1, c.id FROM contacts c
             WHERE c.client_id = $2 AND c.id = ANY($3) AND NOT c.opted_out
             ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(client_id)
        .bind(contact_ids)
        .execute(&mut *tx)
        .await?
        .rows_affected() as i64;

        sqlx::query("UPDATE campaigns SET audience_count = $2 WHERE id = $1")
            .bind(id)
            .bind(inserted)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!(campaign_id = id, audience_count = inserted, "Campaign audience replaced");
        Ok(inserted)
    }

    /// Full contact rows of a campaign's audience, skipping opted-out contacts.
    pub async fn audience_contacts(pool: &PgPool, id: DbId) -> Result<Vec<Contact>, sqlx::Error> {
        sqlx::query_as::<_, Contact>(
            "SELECT c.id, c.client_id, c.name, c.phone, c.email, c.attributes, c.opted_out,
                    c.created_at, c.updated_at
             FROM campaign_audience a
             JOIN contacts c ON c.id = a.contact_id
             WHERE a.campaign_id = $1 AND NOT c.opted_out
             ORDER BY c.id",
        )
        .bind(id)
        .fetch_all(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Launch a draft: debit the wallet, queue every recipient, and move the
    /// campaign to `plan.status`, all in one transaction.
    ///
    /// Nothing is written when the wallet cannot cover `plan.cost_cents`.
    pub async fn launch(
        pool: &PgPool,
        client_id: DbId,
        id: DbId,
        plan: &LaunchPlan,
    ) -> Result<Campaign, RepoError> {
        let target = plan.status;
        let mut tx = pool.begin().await?;

        let (status, _) = Self::lock(&mut tx, client_id, id).await?;
        status.ensure_transition(target)?;

        if plan.cost_cents > 0 {
            WalletRepo::record_in_tx(
                &mut tx,
                client_id,
                &LedgerEntry {
                    kind: TransactionKind::Debit,
                    amount_cents: plan.cost_cents,
                    description: Some("Campaign launch"),
                    campaign_id: Some(id),
                    created_by: Some(plan.launched_by),
                },
            )
            .await?;
        }

        let contact_ids: Vec<Option<DbId>> = plan.recipients.iter().map(|r| r.contact_id).collect();
        let phones: Vec<&str> = plan.recipients.iter().map(|r| r.phone.as_str()).collect();
        let bodies: Vec<&str> = plan
            .recipients
            .iter()
            .map(|r| r.rendered_body.as_str())
            .collect();

        let queued = sqlx::query(
            "INSERT INTO campaign_recipients (campaign_id, contact_id, phone, rendered_body)
             SELECT $1, r.contact_id, r.phone, r.rendered_body
             FROM UNNEST($2::bigint[], $3::text[], $4::text[]) AS r(contact_id, phone, rendered_body)
             ON CONFLICT (campaign_id, phone) DO NOTHING",
        )
        .bind(id)
        .bind(&contact_ids)
        .bind(&phones)
        .bind(&bodies)
        .execute(&mut *tx)
        .await?
        .rows_affected() as i64;

        let query = format!(
            "UPDATE campaigns SET
                status = $2,
                launched_at = NOW(),
                estimated_cost_cents = $3,
                audience_count = $4
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let campaign = sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .bind(target.as_str())
            .bind(plan.cost_cents)
            .bind(queued)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(
            campaign_id = id,
            client_id,
            status = %target,
            recipients = queued,
            cost_cents = plan.cost_cents,
            "Campaign launched"
        );
        Ok(campaign)
    }

    /// Cancel a campaign. A scheduled campaign has sent nothing, so its
    /// launch debit is refunded. Recipients still queued are marked failed.
    pub async fn cancel(
        pool: &PgPool,
        client_id: DbId,
        id: DbId,
        cancelled_by: DbId,
    ) -> Result<Campaign, RepoError> {
        let mut tx = pool.begin().await?;

        let (status, cost) = Self::lock(&mut tx, client_id, id).await?;
        status.ensure_transition(CampaignStatus::Cancelled)?;

        let refund = cost.unwrap_or(0);
        if status == CampaignStatus::Scheduled && refund > 0 {
            WalletRepo::record_in_tx(
                &mut tx,
                client_id,
                &LedgerEntry {
                    kind: TransactionKind::Credit,
                    amount_cents: refund,
                    description: Some("Refund for cancelled campaign"),
                    campaign_id: Some(id),
                    created_by: Some(cancelled_by),
                },
            )
            .await?;
        }

        sqlx::query(
            "UPDATE campaign_recipients
             SET status = 'failed', error_message = 'Campaign cancelled', status_updated_at = NOW()
             WHERE campaign_id = $1 AND status = 'queued'",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let campaign = Self::set_status(&mut tx, id, CampaignStatus::Cancelled).await?;
        tx.commit().await?;
        tracing::info!(campaign_id = id, client_id, from = %status, "Campaign cancelled");
        Ok(campaign)
    }

    /// Mark a running campaign completed.
    pub async fn complete(pool: &PgPool, client_id: DbId, id: DbId) -> Result<Campaign, RepoError> {
        let mut tx = pool.begin().await?;
        let (status, _) = Self::lock(&mut tx, client_id, id).await?;
        status.ensure_transition(CampaignStatus::Completed)?;
        let campaign = Self::set_status(&mut tx, id, CampaignStatus::Completed).await?;
        tx.commit().await?;
        Ok(campaign)
    }

    /// Move every scheduled campaign whose time has come to `running`.
    /// Returns how many were started.
    pub async fn start_due(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE campaigns SET status = 'running'
             WHERE status = 'scheduled' AND scheduled_at <= NOW()",
        )
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    // -----------------------------------------------------------------------
    // Recipients
    // -----------------------------------------------------------------------

    pub async fn list_recipients(
        pool: &PgPool,
        campaign_id: DbId,
        status: Option<RecipientStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CampaignRecipient>, sqlx::Error> {
        let query = format!(
            "SELECT {RECIPIENT_COLUMNS} FROM campaign_recipients
             WHERE campaign_id = $1 AND ($2::text IS NULL OR status = $2)
             ORDER BY id ASC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, CampaignRecipient>(&query)
            .bind(campaign_id)
            .bind(status.map(RecipientStatus::as_str))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn find_recipient(
        pool: &PgPool,
        campaign_id: DbId,
        recipient_id: DbId,
    ) -> Result<Option<CampaignRecipient>, sqlx::Error> {
        let query = format!(
            "SELECT {RECIPIENT_COLUMNS} FROM campaign_recipients WHERE id = $1 AND campaign_id = $2"
        );
        sqlx::query_as::<_, CampaignRecipient>(&query)
            .bind(recipient_id)
            .bind(campaign_id)
            .fetch_optional(pool)
            .await
    }

    /// Record a delivery status. Only applied while the stored status is
    /// still `expected`, so concurrent receipts cannot move it backwards.
    pub async fn update_recipient_status(
        pool: &PgPool,
        campaign_id: DbId,
        recipient_id: DbId,
        expected: RecipientStatus,
        status: RecipientStatus,
        error_message: Option<&str>,
    ) -> Result<Option<CampaignRecipient>, sqlx::Error> {
        let query = format!(
            "UPDATE campaign_recipients
             SET status = $4, error_message = $5, status_updated_at = NOW()
             WHERE id = $1 AND campaign_id = $2 AND status = $3
             RETURNING {RECIPIENT_COLUMNS}"
        );
        sqlx::query_as::<_, CampaignRecipient>(&query)
            .bind(recipient_id)
            .bind(campaign_id)
            .bind(expected.as_str())
            .bind(status.as_str())
            .bind(error_message)
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Lock the campaign row and return its status and recorded cost.
    async fn lock(
        tx: &mut Transaction<'_, Postgres>,
        client_id: DbId,
        id: DbId,
    ) -> Result<(CampaignStatus, Option<Cents>), RepoError> {
        let row: Option<(String, Option<Cents>)> = sqlx::query_as(
            "SELECT status, estimated_cost_cents FROM campaigns
             WHERE id = $1 AND client_id = $2
             FOR UPDATE",
        )
        .bind(id)
        .bind(client_id)
        .fetch_optional(&mut **tx)
        .await?;

        let (status, cost) = row.ok_or(CoreError::NotFound {
            entity: "Campaign",
            id,
        })?;
        Ok((status.parse()?, cost))
    }

    async fn set_status(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        status: CampaignStatus,
    ) -> Result<Campaign, sqlx::Error> {
        let query = format!(
            "UPDATE campaigns SET status = $2, completed_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_one(&mut **tx)
            .await
    }
}
