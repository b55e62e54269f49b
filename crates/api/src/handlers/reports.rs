//! Tenant reports: per-campaign delivery totals and wallet spend.

use axum::extract::{Path, Query, State};
use axum::Json;
use msgdesk_core::error::CoreError;
use msgdesk_core::types::DbId;
use msgdesk_db::models::report::{CampaignReportRow, DailySpend, StatusCount};
use msgdesk_db::repositories::{CampaignRepo, ReportRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::TenantUser;
use crate::query::{DateRangeParams, PaginationParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/reports/campaigns?limit=&offset=
pub async fn campaigns(
    user: TenantUser,
    State(state): State<AppState>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<CampaignReportRow>>>> {
    let (limit, offset) = page.clamped();
    let rows = ReportRepo::campaign_summaries(&state.pool, user.client_id, limit, offset).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// GET /api/reports/campaigns/{id}/delivery
pub async fn delivery(
    user: TenantUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<StatusCount>>>> {
    CampaignRepo::find_by_id(&state.pool, user.client_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Campaign",
            id,
        }))?;
    let rows = ReportRepo::delivery_breakdown(&state.pool, id).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// GET /api/reports/spend?from=&to=
pub async fn spend(
    user: TenantUser,
    State(state): State<AppState>,
    Query(range): Query<DateRangeParams>,
) -> AppResult<Json<DataResponse<Vec<DailySpend>>>> {
    range.validate()?;
    let rows = ReportRepo::daily_spend(&state.pool, user.client_id, range.from, range.to).await?;
    Ok(Json(DataResponse { data: rows }))
}
