use msgdesk_core::roles::is_client_role;
use msgdesk_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A seeded row from the `roles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Role {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
}

impl Role {
    /// Whether users holding this role belong to a client.
    pub fn is_client_role(&self) -> bool {
        is_client_role(&self.name)
    }
}
