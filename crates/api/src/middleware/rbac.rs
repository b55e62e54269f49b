//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the requirement, so authorization is enforced at the type level.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use msgdesk_core::error::CoreError;
use msgdesk_core::roles::is_client_role;
use msgdesk_core::types::DbId;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `super_admin` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireSuperAdmin(user): RequireSuperAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireSuperAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireSuperAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_super_admin() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Super admin role required".into(),
            )));
        }
        Ok(RequireSuperAdmin(user))
    }
}

/// A user acting inside their own client account.
///
/// Every tenant-scoped query is filtered by [`TenantUser::client_id`].
#[derive(Debug, Clone)]
pub struct TenantUser {
    pub user_id: DbId,
    pub role: String,
    pub client_id: DbId,
}

impl FromRequestParts<AppState> for TenantUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        match user.client_id {
            Some(client_id) if is_client_role(&user.role) => Ok(TenantUser {
                user_id: user.user_id,
                role: user.role,
                client_id,
            }),
            _ => Err(AppError::Core(CoreError::Forbidden(
                "A client account is required".into(),
            ))),
        }
    }
}
