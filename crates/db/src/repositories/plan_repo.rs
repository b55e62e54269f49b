//! Repository for the `plans` table.

use msgdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::plan::{CreatePlan, Plan, UpdatePlan};

const COLUMNS: &str = "id, name, description, monthly_fee_cents, sms_rate_cents, \
    rcs_rate_cents, whatsapp_rate_cents, monthly_message_quota, is_active, created_at, updated_at";

/// Provides CRUD operations for pricing plans.
pub struct PlanRepo;

impl PlanRepo {
    pub async fn create(pool: &PgPool, input: &CreatePlan) -> Result<Plan, sqlx::Error> {
        let query = format!(
            "INSERT INTO plans
                (name, description, monthly_fee_cents, sms_rate_cents, rcs_rate_cents,
                 whatsapp_rate_cents, monthly_message_quota)
             VALUES ($1, $2, COALESCE($3, 0), $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Plan>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.monthly_fee_cents)
            .bind(input.sms_rate_cents)
            .bind(input.rcs_rate_cents)
            .bind(input.whatsapp_rate_cents)
            .bind(input.monthly_message_quota)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Plan>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM plans WHERE id = $1");
        sqlx::query_as::<_, Plan>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List plans by name. Inactive plans are only included when asked for.
    pub async fn list(pool: &PgPool, include_inactive: bool) -> Result<Vec<Plan>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM plans
             WHERE is_active OR $1
             ORDER BY name ASC"
        );
        sqlx::query_as::<_, Plan>(&query)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    /// Update a plan. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePlan,
    ) -> Result<Option<Plan>, sqlx::Error> {
        let query = format!(
            "UPDATE plans SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                monthly_fee_cents = COALESCE($4, monthly_fee_cents),
                sms_rate_cents = COALESCE($5, sms_rate_cents),
                rcs_rate_cents = COALESCE($6, rcs_rate_cents),
                whatsapp_rate_cents = COALESCE($7, whatsapp_rate_cents),
                monthly_message_quota = COALESCE($8, monthly_message_quota),
                is_active = COALESCE($9, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Plan>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.monthly_fee_cents)
            .bind(input.sms_rate_cents)
            .bind(input.rcs_rate_cents)
            .bind(input.whatsapp_rate_cents)
            .bind(input.monthly_message_quota)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Delete a plan. Clients on it fall back to platform rates.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM plans WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
