//! Repository for the `clients` table.

use msgdesk_core::channels::ChannelRates;
use msgdesk_core::search::contains_pattern;
use msgdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::client::{Client, ClientOverview, CreateClient, UpdateClient};

const COLUMNS: &str = "id, name, company_name, email, phone, plan_id, affiliate_id, \
    is_active, created_at, updated_at";

/// Provides CRUD operations for clients (tenants).
pub struct ClientRepo;

impl ClientRepo {
    /// Insert a client and its empty wallet in one transaction.
    pub async fn create(pool: &PgPool, input: &CreateClient) -> Result<Client, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO clients (name, company_name, email, phone, plan_id, affiliate_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let client = sqlx::query_as::<_, Client>(&query)
            .bind(&input.name)
            .bind(&input.company_name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(input.plan_id)
            .bind(input.affiliate_id)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO wallets (client_id) VALUES ($1)")
            .bind(client.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(client)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Client>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM clients WHERE id = $1");
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List clients with plan name and balance, newest first. `search`
    /// matches name, company, or email.
    pub async fn list_overview(
        pool: &PgPool,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ClientOverview>, sqlx::Error> {
        let pattern = search.map(contains_pattern);
        sqlx::query_as::<_, ClientOverview>(
            "SELECT c.id, c.name, c.company_name, c.email, c.plan_id, p.name AS plan_name,
                    c.affiliate_id, COALESCE(w.balance_cents, 0) AS balance_cents,
                    c.is_active, c.created_at
             FROM clients c
             LEFT JOIN plans p ON p.id = c.plan_id
             LEFT JOIN wallets w ON w.client_id = c.id
             WHERE $1::text IS NULL
                OR c.name ILIKE $1 OR c.company_name ILIKE $1 OR c.email ILIKE $1
             ORDER BY c.created_at DESC, c.id DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Update a client. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateClient,
    ) -> Result<Option<Client>, sqlx::Error> {
        let query = format!(
            "UPDATE clients SET
                name = COALESCE($2, name),
                company_name = COALESCE($3, company_name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                plan_id = COALESCE($6, plan_id),
                affiliate_id = COALESCE($7, affiliate_id),
                is_active = COALESCE($8, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.company_name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(input.plan_id)
            .bind(input.affiliate_id)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Deactivate a client. Returns `true` if the row changed.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE clients SET is_active = false WHERE id = $1 AND is_active = true")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Per-message rates from the client's plan, or `None` when the client
    /// has no active plan.
    pub async fn plan_rates(
        pool: &PgPool,
        client_id: DbId,
    ) -> Result<Option<ChannelRates>, sqlx::Error> {
        let row: Option<(i64, i64, i64)> = sqlx::query_as(
            "SELECT p.sms_rate_cents, p.rcs_rate_cents, p.whatsapp_rate_cents
             FROM clients c
             JOIN plans p ON p.id = c.plan_id
             WHERE c.id = $1 AND p.is_active",
        )
        .bind(client_id)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|(sms, rcs, whatsapp)| ChannelRates { sms, rcs, whatsapp }))
    }
}
