//! Well-known role name constants.
//!
//! These must match the seed data in `20260301000001_create_roles_table.sql`.

/// Platform operator. Not bound to any client.
pub const ROLE_SUPER_ADMIN: &str = "super_admin";
/// Administrator of a single client (tenant).
pub const ROLE_CLIENT_ADMIN: &str = "client_admin";
/// Day-to-day operator within a client.
pub const ROLE_AGENT: &str = "agent";

/// Roles a super admin may assign to client users.
pub const CLIENT_ROLES: &[&str] = &[ROLE_CLIENT_ADMIN, ROLE_AGENT];

/// Returns `true` if `role` may be assigned to a user that belongs to a client.
pub fn is_client_role(role: &str) -> bool {
    CLIENT_ROLES.contains(&role)
}
