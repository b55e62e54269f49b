//! Contact model and DTOs.

use msgdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// Free-form per-contact attributes, usually extra CSV columns.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// A contact row from the `contacts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Contact {
    pub id: DbId,
    pub client_id: DbId,
    pub name: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub attributes: Json<Attributes>,
    pub opted_out: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a contact.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateContact {
    pub name: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    #[serde(default)]
    pub attributes: Attributes,
}

/// DTO for updating a contact. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateContact {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub attributes: Option<Attributes>,
    pub opted_out: Option<bool>,
}

/// Outcome of a bulk CSV import.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    pub inserted: u64,
    pub updated: u64,
    /// Ids of every imported contact, in file order.
    pub contact_ids: Vec<DbId>,
}
