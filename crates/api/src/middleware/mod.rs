//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireSuperAdmin`] -- Requires the `super_admin` role.
//! - [`rbac::TenantUser`] -- Requires a user acting inside a client account.

pub mod auth;
pub mod rbac;
