//! Client (tenant) model and DTOs.

use msgdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A client row from the `clients` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Client {
    pub id: DbId,
    pub name: String,
    pub company_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub plan_id: Option<DbId>,
    pub affiliate_id: Option<DbId>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A client joined with its plan name and wallet balance, for the admin list.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ClientOverview {
    pub id: DbId,
    pub name: String,
    pub company_name: Option<String>,
    pub email: String,
    pub plan_id: Option<DbId>,
    pub plan_name: Option<String>,
    pub affiliate_id: Option<DbId>,
    pub balance_cents: i64,
    pub is_active: bool,
    pub created_at: Timestamp,
}

/// DTO for creating a client.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateClient {
    pub name: String,
    pub company_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub plan_id: Option<DbId>,
    pub affiliate_id: Option<DbId>,
}

/// DTO for updating a client. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateClient {
    pub name: Option<String>,
    pub company_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub plan_id: Option<DbId>,
    pub affiliate_id: Option<DbId>,
    pub is_active: Option<bool>,
}
