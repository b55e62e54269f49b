//! Dashboard headline numbers.

use axum::extract::State;
use axum::Json;
use msgdesk_core::error::CoreError;
use msgdesk_db::models::report::{ClientDashboardStats, PlatformDashboardStats};
use msgdesk_db::repositories::ReportRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Platform totals for super admins, the caller's own account otherwise.
#[derive(Debug, Serialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum DashboardStats {
    Platform(PlatformDashboardStats),
    Client(ClientDashboardStats),
}

/// GET /api/dashboard/stats
pub async fn stats(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<DashboardStats>>> {
    let stats = match user.client_id {
        _ if user.is_super_admin() => {
            DashboardStats::Platform(ReportRepo::platform_dashboard(&state.pool).await?)
        }
        Some(client_id) => {
            DashboardStats::Client(ReportRepo::client_dashboard(&state.pool, client_id).await?)
        }
        None => {
            return Err(AppError::Core(CoreError::Forbidden(
                "A client account is required".into(),
            )));
        }
    };
    Ok(Json(DataResponse { data: stats }))
}
