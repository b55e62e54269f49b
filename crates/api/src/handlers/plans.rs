//! Handlers for the `/plans` resource.
//!
//! Any signed-in user can read plans; only super admins can change them.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use msgdesk_core::error::CoreError;
use msgdesk_core::types::{Cents, DbId};
use msgdesk_core::validation::{
    validate_optional_text, validate_required_text, MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH,
};
use msgdesk_db::models::plan::{CreatePlan, Plan, UpdatePlan};
use msgdesk_db::repositories::PlanRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireSuperAdmin;
use crate::query::IncludeInactiveParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/plans
///
/// `include_inactive` is honoured for super admins only.
pub async fn list(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<Json<DataResponse<Vec<Plan>>>> {
    let include_inactive = params.include_inactive && user.is_super_admin();
    let plans = PlanRepo::list(&state.pool, include_inactive).await?;
    Ok(Json(DataResponse { data: plans }))
}

/// GET /api/plans/{id}
pub async fn get_by_id(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Plan>>> {
    let plan = PlanRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Plan", id }))?;
    Ok(Json(DataResponse { data: plan }))
}

/// POST /api/plans
pub async fn create(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreatePlan>,
) -> AppResult<(StatusCode, Json<DataResponse<Plan>>)> {
    validate_required_text("Plan name", &input.name, MAX_NAME_LENGTH)?;
    validate_optional_text("Description", input.description.as_deref(), MAX_DESCRIPTION_LENGTH)?;
    validate_amounts(&[
        ("Monthly fee", input.monthly_fee_cents),
        ("SMS rate", Some(input.sms_rate_cents)),
        ("RCS rate", Some(input.rcs_rate_cents)),
        ("WhatsApp rate", Some(input.whatsapp_rate_cents)),
        ("Monthly message quota", input.monthly_message_quota),
    ])?;

    let plan = PlanRepo::create(&state.pool, &input).await?;
    tracing::info!(plan_id = plan.id, name = %plan.name, "Plan created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: plan })))
}

/// PUT /api/plans/{id}
pub async fn update(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePlan>,
) -> AppResult<Json<DataResponse<Plan>>> {
    if let Some(name) = &input.name {
        validate_required_text("Plan name", name, MAX_NAME_LENGTH)?;
    }
    validate_optional_text("Description", input.description.as_deref(), MAX_DESCRIPTION_LENGTH)?;
    validate_amounts(&[
        ("Monthly fee", input.monthly_fee_cents),
        ("SMS rate", input.sms_rate_cents),
        ("RCS rate", input.rcs_rate_cents),
        ("WhatsApp rate", input.whatsapp_rate_cents),
        ("Monthly message quota", input.monthly_message_quota),
    ])?;

    let plan = PlanRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Plan", id }))?;
    Ok(Json(DataResponse { data: plan }))
}

/// DELETE /api/plans/{id}
///
/// Clients on the plan fall back to the platform default rates.
pub async fn delete(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if PlanRepo::delete(&state.pool, id).await? {
        tracing::info!(plan_id = id, "Plan deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "Plan", id }))
    }
}

fn validate_amounts(amounts: &[(&str, Option<Cents>)]) -> Result<(), CoreError> {
    for (field, amount) in amounts {
        if let Some(value) = amount {
            if *value < 0 {
                return Err(CoreError::Validation(format!(
                    "{field} must not be negative (got {value})"
                )));
            }
        }
    }
    Ok(())
}
