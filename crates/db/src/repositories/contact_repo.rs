//! Repository for the `contacts` table.

use msgdesk_core::audience::{ContactFilter, ContactSummary};
use msgdesk_core::contacts_csv::CsvContactRow;
use msgdesk_core::search::contains_pattern;
use msgdesk_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::contact::{Contact, CreateContact, ImportSummary, UpdateContact};

const COLUMNS: &str =
    "id, client_id, name, phone, email, attributes, opted_out, created_at, updated_at";

/// Search predicate on `$2`, a `%needle%` pattern or NULL.
const SEARCH_CLAUSE: &str =
    "($2::text IS NULL OR name ILIKE $2 OR phone ILIKE $2 OR email ILIKE $2)";

/// Provides CRUD, search, and bulk import for a client's contacts.
pub struct ContactRepo;

impl ContactRepo {
    pub async fn create(
        pool: &PgPool,
        client_id: DbId,
        input: &CreateContact,
    ) -> Result<Contact, sqlx::Error> {
        let query = format!(
            "INSERT INTO contacts (client_id, name, phone, email, attributes)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(client_id)
            .bind(&input.name)
            .bind(&input.phone)
            .bind(&input.email)
            .bind(Json(&input.attributes))
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        client_id: DbId,
        id: DbId,
    ) -> Result<Option<Contact>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contacts WHERE id = $1 AND client_id = $2");
        sqlx::query_as::<_, Contact>(&query)
            .bind(id)
            .bind(client_id)
            .fetch_optional(pool)
            .await
    }

    /// One page of contacts matching `filter`, ordered by name then id.
    pub async fn list(
        pool: &PgPool,
        client_id: DbId,
        filter: &ContactFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Contact>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM contacts
             WHERE client_id = $1 AND {SEARCH_CLAUSE}
             ORDER BY name ASC NULLS LAST, id ASC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(client_id)
            .bind(search_pattern(filter))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Total contacts matching `filter`.
    pub async fn count(
        pool: &PgPool,
        client_id: DbId,
        filter: &ContactFilter,
    ) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM contacts WHERE client_id = $1 AND {SEARCH_CLAUSE}");
        sqlx::query_scalar(&query)
            .bind(client_id)
            .bind(search_pattern(filter))
            .fetch_one(pool)
            .await
    }

    /// Opted-in contacts of a client, reduced to the fields "select all"
    /// filters on.
    pub async fn selectable(
        pool: &PgPool,
        client_id: DbId,
    ) -> Result<Vec<ContactSummary>, sqlx::Error> {
        let rows: Vec<(DbId, Option<String>, String, Option<String>)> = sqlx::query_as(
            "SELECT id, name, phone, email FROM contacts
             WHERE client_id = $1 AND NOT opted_out
             ORDER BY id ASC",
        )
        .bind(client_id)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, phone, email)| ContactSummary {
                id,
                name,
                phone,
                email,
            })
            .collect())
    }

    /// Every contact of a client, for export.
    pub async fn list_all(pool: &PgPool, client_id: DbId) -> Result<Vec<Contact>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM contacts WHERE client_id = $1 ORDER BY name ASC NULLS LAST, id ASC"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(client_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        client_id: DbId,
        id: DbId,
        input: &UpdateContact,
    ) -> Result<Option<Contact>, sqlx::Error> {
        let query = format!(
            "UPDATE contacts SET
                name = COALESCE($3, name),
                phone = COALESCE($4, phone),
                email = COALESCE($5, email),
                attributes = COALESCE($6, attributes),
                opted_out = COALESCE($7, opted_out)
             WHERE id = $1 AND client_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(id)
            .bind(client_id)
            .bind(&input.name)
            .bind(&input.phone)
            .bind(&input.email)
            .bind(input.attributes.as_ref().map(Json))
            .bind(input.opted_out)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, client_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1 AND client_id = $2")
            .bind(id)
            .bind(client_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert or update parsed CSV rows in one transaction, keyed on phone.
    ///
    /// Existing contacts keep their name and email unless the row supplies
    /// one; attributes are merged with the row's values winning.
    pub async fn upsert_rows(
        pool: &PgPool,
        client_id: DbId,
        rows: &[CsvContactRow],
    ) -> Result<ImportSummary, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut summary = ImportSummary::default();

        for row in rows {
            let (id, inserted): (DbId, bool) = sqlx::query_as(
                "INSERT INTO contacts (client_id, name, phone, email, attributes)
                 VALUES ($1, $2, $3, $4, $5)
                 ON CONFLICT (client_id, phone) DO UPDATE SET
                    name = COALESCE(EXCLUDED.name, contacts.name),
                    email = COALESCE(EXCLUDED.email, contacts.email),
                    attributes = contacts.attributes || EXCLUDED.attributes
                 RETURNING id, (xmax = 0) AS inserted",
            )
            .bind(client_id)
            .bind(&row.name)
            .bind(&row.phone)
            .bind(&row.email)
            .bind(Json(&row.attributes))
            .fetch_one(&mut *tx)
            .await?;

            if inserted {
                summary.inserted += 1;
            } else {
                summary.updated += 1;
            }
            summary.contact_ids.push(id);
        }

        tx.commit().await?;
        Ok(summary)
    }
}

fn search_pattern(filter: &ContactFilter) -> Option<String> {
    filter.needle().as_deref().map(contains_pattern)
}
