//! Repository for the RCS template tables created by
//! [`crate::schema::bootstrap_rcs_template_schema`].

use std::collections::BTreeMap;

use chrono::NaiveDate;
use msgdesk_core::rcs::{declared_variables, ButtonSpec, TemplateStatus, TemplateType};
use msgdesk_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::rcs_template::{
    CreateRcsTemplate, RcsTemplate, RcsTemplateAnalytics, RcsTemplateApproval, RcsTemplateButton,
    RcsTemplateDetail, RcsTemplateVariable, RecordAnalytics, UpdateRcsTemplate,
};

const COLUMNS: &str = "id, client_id, bot_id, name, template_type, body, card_title, media_url, \
    status, created_at, updated_at";

const BUTTON_COLUMNS: &str = "id, template_id, button_type, label, value, position";
const VARIABLE_COLUMNS: &str = "id, template_id, name, sample_value, position";
const ANALYTICS_COLUMNS: &str = "id, template_id, recorded_on, sent_count, delivered_count, \
    read_count, clicked_count";
const APPROVAL_COLUMNS: &str = "id, template_id, status, notes, reviewed_by, created_at";

/// Provides CRUD, approval workflow, and analytics for RCS templates.
pub struct RcsTemplateRepo;

impl RcsTemplateRepo {
    /// Insert a template with its buttons and body-derived variables in one
    /// transaction.
    pub async fn create(
        pool: &PgPool,
        client_id: DbId,
        template_type: TemplateType,
        input: &CreateRcsTemplate,
    ) -> Result<RcsTemplate, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO rcs_templates
                (client_id, bot_id, name, template_type, body, card_title, media_url)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        let template = sqlx::query_as::<_, RcsTemplate>(&query)
            .bind(client_id)
            .bind(input.bot_id)
            .bind(&input.name)
            .bind(template_type.as_str())
            .bind(&input.body)
            .bind(&input.card_title)
            .bind(&input.media_url)
            .fetch_one(&mut *tx)
            .await?;

        Self::replace_buttons(&mut tx, template.id, &input.buttons).await?;
        Self::replace_variables(&mut tx, template.id, &template.body, &input.sample_values)
            .await?;

        tx.commit().await?;
        Ok(template)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        client_id: DbId,
        id: DbId,
    ) -> Result<Option<RcsTemplate>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM rcs_templates WHERE id = $1 AND client_id = $2");
        sqlx::query_as::<_, RcsTemplate>(&query)
            .bind(id)
            .bind(client_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a template regardless of owner. Used by platform reviewers.
    pub async fn find_any(pool: &PgPool, id: DbId) -> Result<Option<RcsTemplate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rcs_templates WHERE id = $1");
        sqlx::query_as::<_, RcsTemplate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Load the buttons, variables, and approval history of `template`.
    pub async fn detail(
        pool: &PgPool,
        template: RcsTemplate,
    ) -> Result<RcsTemplateDetail, sqlx::Error> {
        let buttons = sqlx::query_as::<_, RcsTemplateButton>(&format!(
            "SELECT {BUTTON_COLUMNS} FROM rcs_template_buttons
             WHERE template_id = $1 ORDER BY position ASC, id ASC"
        ))
        .bind(template.id)
        .fetch_all(pool)
        .await?;

        let variables = sqlx::query_as::<_, RcsTemplateVariable>(&format!(
            "SELECT {VARIABLE_COLUMNS} FROM rcs_template_variables
             WHERE template_id = $1 ORDER BY position ASC"
        ))
        .bind(template.id)
        .fetch_all(pool)
        .await?;

        let approvals = sqlx::query_as::<_, RcsTemplateApproval>(&format!(
            "SELECT {APPROVAL_COLUMNS} FROM rcs_template_approvals
             WHERE template_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(template.id)
        .fetch_all(pool)
        .await?;

        Ok(RcsTemplateDetail {
            template,
            buttons,
            variables,
            approvals,
        })
    }

    /// List a client's templates, optionally filtered by status.
    pub async fn list(
        pool: &PgPool,
        client_id: DbId,
        status: Option<TemplateStatus>,
    ) -> Result<Vec<RcsTemplate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rcs_templates
             WHERE client_id = $1 AND ($2::text IS NULL OR status = $2)
             ORDER BY updated_at DESC, id DESC"
        );
        sqlx::query_as::<_, RcsTemplate>(&query)
            .bind(client_id)
            .bind(status.map(TemplateStatus::as_str))
            .fetch_all(pool)
            .await
    }

    /// Update a template and return it to `draft`. Buttons are replaced when
    /// given; variables are re-derived from the (possibly new) body and keep
    /// their stored sample values unless new ones are supplied.
    ///
    /// Returns `None` when the template does not exist for this client or is
    /// awaiting review.
    pub async fn update(
        pool: &PgPool,
        client_id: DbId,
        id: DbId,
        template_type: Option<TemplateType>,
        input: &UpdateRcsTemplate,
    ) -> Result<Option<RcsTemplate>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE rcs_templates SET
                bot_id = COALESCE($3, bot_id),
                name = COALESCE($4, name),
                template_type = COALESCE($5, template_type),
                body = COALESCE($6, body),
                card_title = COALESCE($7, card_title),
                media_url = COALESCE($8, media_url),
                status = 'draft',
                updated_at = NOW()
             WHERE id = $1 AND client_id = $2 AND status <> 'pending'
             RETURNING {COLUMNS}"
        );
        let Some(template) = sqlx::query_as::<_, RcsTemplate>(&query)
            .bind(id)
            .bind(client_id)
            .bind(input.bot_id)
            .bind(&input.name)
            .bind(template_type.map(TemplateType::as_str))
            .bind(&input.body)
            .bind(&input.card_title)
            .bind(&input.media_url)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        if let Some(buttons) = &input.buttons {
            Self::replace_buttons(&mut tx, template.id, buttons).await?;
        }
        if input.body.is_some() || input.sample_values.is_some() {
            let mut samples: BTreeMap<String, String> = sqlx::query_as::<_, (String, String)>(
                "SELECT name, sample_value FROM rcs_template_variables
                 WHERE template_id = $1 AND sample_value IS NOT NULL",
            )
            .bind(template.id)
            .fetch_all(&mut *tx)
            .await?
            .into_iter()
            .collect();
            if let Some(supplied) = &input.sample_values {
                samples.extend(supplied.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            Self::replace_variables(&mut tx, template.id, &template.body, &samples).await?;
        }

        tx.commit().await?;
        Ok(Some(template))
    }

    /// Delete a template; its child rows cascade.
    pub async fn delete(pool: &PgPool, client_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM rcs_templates WHERE id = $1 AND client_id = $2")
            .bind(id)
            .bind(client_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Move a template from `from` to `to` and append an approval row, in one
    /// transaction. Returns `None` if the template is no longer in `from`.
    pub async fn change_status(
        pool: &PgPool,
        id: DbId,
        from: TemplateStatus,
        to: TemplateStatus,
        notes: Option<&str>,
        reviewed_by: Option<DbId>,
    ) -> Result<Option<RcsTemplate>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE rcs_templates SET status = $3, updated_at = NOW()
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        let Some(template) = sqlx::query_as::<_, RcsTemplate>(&query)
            .bind(id)
            .bind(from.as_str())
            .bind(to.as_str())
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        sqlx::query(
            "INSERT INTO rcs_template_approvals (template_id, status, notes, reviewed_by)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(id)
        .bind(to.as_str())
        .bind(notes)
        .bind(reviewed_by)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(template))
    }

    /// Add a day's counts to the template's analytics, creating the row if
    /// needed.
    pub async fn record_analytics(
        pool: &PgPool,
        template_id: DbId,
        input: &RecordAnalytics,
    ) -> Result<RcsTemplateAnalytics, sqlx::Error> {
        let query = format!(
            "INSERT INTO rcs_template_analytics
                (template_id, recorded_on, sent_count, delivered_count, read_count, clicked_count)
             VALUES ($1, COALESCE($2, CURRENT_DATE), $3, $4, $5, $6)
             ON CONFLICT (template_id, recorded_on) DO UPDATE SET
                sent_count = rcs_template_analytics.sent_count + EXCLUDED.sent_count,
                delivered_count = rcs_template_analytics.delivered_count + EXCLUDED.delivered_count,
                read_count = rcs_template_analytics.read_count + EXCLUDED.read_count,
                clicked_count = rcs_template_analytics.clicked_count + EXCLUDED.clicked_count
             RETURNING {ANALYTICS_COLUMNS}"
        );
        sqlx::query_as::<_, RcsTemplateAnalytics>(&query)
            .bind(template_id)
            .bind(input.recorded_on)
            .bind(input.sent_count)
            .bind(input.delivered_count)
            .bind(input.read_count)
            .bind(input.clicked_count)
            .fetch_one(pool)
            .await
    }

    /// Daily analytics rows between two dates (inclusive), oldest first.
    pub async fn list_analytics(
        pool: &PgPool,
        template_id: DbId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<RcsTemplateAnalytics>, sqlx::Error> {
        let query = format!(
            "SELECT {ANALYTICS_COLUMNS} FROM rcs_template_analytics
             WHERE template_id = $1
               AND ($2::date IS NULL OR recorded_on >= $2)
               AND ($3::date IS NULL OR recorded_on <= $3)
             ORDER BY recorded_on ASC"
        );
        sqlx::query_as::<_, RcsTemplateAnalytics>(&query)
            .bind(template_id)
            .bind(from)
            .bind(to)
            .fetch_all(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    async fn replace_buttons(
        tx: &mut Transaction<'_, Postgres>,
        template_id: DbId,
        buttons: &[ButtonSpec],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM rcs_template_buttons WHERE template_id = $1")
            .bind(template_id)
            .execute(&mut **tx)
            .await?;

        for (position, button) in (0_i32..).zip(buttons) {
            sqlx::query(
                "INSERT INTO rcs_template_buttons (template_id, button_type, label, value, position)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(template_id)
            .bind(button.button_type.as_str())
            .bind(button.label.trim())
            .bind(button.value.trim())
            .bind(position)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    async fn replace_variables(
        tx: &mut Transaction<'_, Postgres>,
        template_id: DbId,
        body: &str,
        samples: &BTreeMap<String, String>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM rcs_template_variables WHERE template_id = $1")
            .bind(template_id)
            .execute(&mut **tx)
            .await?;

        for (position, name) in declared_variables(body) {
            sqlx::query(
                "INSERT INTO rcs_template_variables (template_id, name, sample_value, position)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(template_id)
            .bind(&name)
            .bind(samples.get(&name))
            .bind(position as i32)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}
