//! Repository for the seeded `roles` table.

use std::collections::HashMap;

use msgdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::role::Role;

/// Read-only access to roles; the set is fixed by migration.
pub struct RoleRepo;

impl RoleRepo {
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Role>, sqlx::Error> {
        sqlx::query_as::<_, Role>("SELECT id, name, description FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Name of `role_id`, or `"unknown"` for an id with no row.
    pub async fn name_of(pool: &PgPool, role_id: DbId) -> Result<String, sqlx::Error> {
        let name: Option<String> = sqlx::query_scalar("SELECT name FROM roles WHERE id = $1")
            .bind(role_id)
            .fetch_optional(pool)
            .await?;
        Ok(name.unwrap_or_else(|| "unknown".to_string()))
    }

    /// Every role name keyed by id, for labelling user lists.
    pub async fn names(pool: &PgPool) -> Result<HashMap<DbId, String>, sqlx::Error> {
        let rows: Vec<(DbId, String)> = sqlx::query_as("SELECT id, name FROM roles")
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().collect())
    }
}
