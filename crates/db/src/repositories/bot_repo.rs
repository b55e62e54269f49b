//! Repository for the `bots` table.
//!
//! Bots are scoped by client and channel: the SMS sender routes and the RCS
//! bot routes share this table but never see each other's rows.

use msgdesk_core::channels::Channel;
use msgdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::bot::{Bot, CreateBot, UpdateBot};

const COLUMNS: &str = "id, client_id, channel, name, sender_id, description, logo_url, \
    brand_color, webhook_url, is_active, created_at, updated_at";

/// Provides CRUD operations for a client's bots on one channel.
pub struct BotRepo;

impl BotRepo {
    pub async fn create(
        pool: &PgPool,
        client_id: DbId,
        channel: Channel,
        input: &CreateBot,
    ) -> Result<Bot, sqlx::Error> {
        let query = format!(
            "INSERT INTO bots
                (client_id, channel, name, sender_id, description, logo_url, brand_color, webhook_url)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Bot>(&query)
            .bind(client_id)
            .bind(channel.as_str())
            .bind(&input.name)
            .bind(&input.sender_id)
            .bind(&input.description)
            .bind(&input.logo_url)
            .bind(&input.brand_color)
            .bind(&input.webhook_url)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        client_id: DbId,
        channel: Channel,
        id: DbId,
    ) -> Result<Option<Bot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM bots WHERE id = $1 AND client_id = $2 AND channel = $3"
        );
        sqlx::query_as::<_, Bot>(&query)
            .bind(id)
            .bind(client_id)
            .bind(channel.as_str())
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        client_id: DbId,
        channel: Channel,
    ) -> Result<Vec<Bot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM bots
             WHERE client_id = $1 AND channel = $2
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Bot>(&query)
            .bind(client_id)
            .bind(channel.as_str())
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        client_id: DbId,
        channel: Channel,
        id: DbId,
        input: &UpdateBot,
    ) -> Result<Option<Bot>, sqlx::Error> {
        let query = format!(
            "UPDATE bots SET
                name = COALESCE($4, name),
                sender_id = COALESCE($5, sender_id),
                description = COALESCE($6, description),
                logo_url = COALESCE($7, logo_url),
                brand_color = COALESCE($8, brand_color),
                webhook_url = COALESCE($9, webhook_url),
                is_active = COALESCE($10, is_active)
             WHERE id = $1 AND client_id = $2 AND channel = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Bot>(&query)
            .bind(id)
            .bind(client_id)
            .bind(channel.as_str())
            .bind(&input.name)
            .bind(&input.sender_id)
            .bind(&input.description)
            .bind(&input.logo_url)
            .bind(&input.brand_color)
            .bind(&input.webhook_url)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Delete a bot. Returns `false` when no bot with this id belongs to the
    /// client on this channel.
    pub async fn delete(
        pool: &PgPool,
        client_id: DbId,
        channel: Channel,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM bots WHERE id = $1 AND client_id = $2 AND channel = $3")
                .bind(id)
                .bind(client_id)
                .bind(channel.as_str())
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
