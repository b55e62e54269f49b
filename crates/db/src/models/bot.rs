//! Bot (sender identity) model and DTOs.

use msgdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A bot row from the `bots` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Bot {
    pub id: DbId,
    pub client_id: DbId,
    pub channel: String,
    pub name: String,
    /// RCS agent id, SMS sender id, or WhatsApp number.
    pub sender_id: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub brand_color: Option<String>,
    pub webhook_url: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a bot. The channel comes from the route.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBot {
    pub name: String,
    pub sender_id: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub brand_color: Option<String>,
    pub webhook_url: Option<String>,
}

/// DTO for updating a bot. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBot {
    pub name: Option<String>,
    pub sender_id: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub brand_color: Option<String>,
    pub webhook_url: Option<String>,
    pub is_active: Option<bool>,
}
