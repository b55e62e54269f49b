//! Handlers for the `/affiliates` resource: referral partners, their
//! commission and payouts. Super admin only.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use msgdesk_core::affiliate::{
    generate_referral_code, validate_commission_bps, validate_referral_code,
};
use msgdesk_core::error::CoreError;
use msgdesk_core::types::DbId;
use msgdesk_core::validation::{
    validate_email, validate_optional_text, validate_required_text, MAX_DESCRIPTION_LENGTH,
    MAX_NAME_LENGTH,
};
use msgdesk_db::models::affiliate::{
    Affiliate, AffiliatePayout, CommissionSummary, CreateAffiliate, CreatePayout,
    UpdateAffiliate,
};
use msgdesk_db::repositories::AffiliateRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireSuperAdmin;
use crate::query::DateRangeParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/affiliates
pub async fn list(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Affiliate>>>> {
    let affiliates = AffiliateRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: affiliates }))
}

/// POST /api/affiliates
///
/// A referral code is generated when none is supplied.
pub async fn create(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Json(mut input): Json<CreateAffiliate>,
) -> AppResult<(StatusCode, Json<DataResponse<Affiliate>>)> {
    validate_required_text("Affiliate name", &input.name, MAX_NAME_LENGTH)?;
    input.email = validate_email(&input.email)?;
    if let Some(bps) = input.commission_bps {
        validate_commission_bps(bps)?;
    }

    let referral_code = match input.referral_code.as_deref() {
        Some(code) => {
            let code = code.trim().to_ascii_uppercase();
            validate_referral_code(&code)?;
            code
        }
        None => generate_referral_code(),
    };

    let affiliate = AffiliateRepo::create(&state.pool, &input, &referral_code).await?;
    tracing::info!(
        affiliate_id = affiliate.id,
        referral_code = %affiliate.referral_code,
        "Affiliate created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: affiliate })))
}

/// GET /api/affiliates/{id}
pub async fn get_by_id(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Affiliate>>> {
    let affiliate = find_affiliate(&state, id).await?;
    Ok(Json(DataResponse { data: affiliate }))
}

/// PUT /api/affiliates/{id}
pub async fn update(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateAffiliate>,
) -> AppResult<Json<DataResponse<Affiliate>>> {
    if let Some(name) = &input.name {
        validate_required_text("Affiliate name", name, MAX_NAME_LENGTH)?;
    }
    input.email = input.email.as_deref().map(validate_email).transpose()?;
    if let Some(bps) = input.commission_bps {
        validate_commission_bps(bps)?;
    }

    let affiliate = AffiliateRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Affiliate",
            id,
        }))?;
    Ok(Json(DataResponse { data: affiliate }))
}

/// DELETE /api/affiliates/{id}
///
/// Referred clients keep their account; their `affiliate_id` is cleared.
pub async fn delete(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if AffiliateRepo::delete(&state.pool, id).await? {
        tracing::info!(affiliate_id = id, "Affiliate deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Affiliate",
            id,
        }))
    }
}

/// GET /api/affiliates/{id}/commission?from=&to=
pub async fn commission(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(range): Query<DateRangeParams>,
) -> AppResult<Json<DataResponse<CommissionSummary>>> {
    range.validate()?;
    let affiliate = find_affiliate(&state, id).await?;
    let summary = AffiliateRepo::commission(&state.pool, &affiliate, range.from, range.to).await?;
    Ok(Json(DataResponse { data: summary }))
}

/// GET /api/affiliates/{id}/payouts
pub async fn list_payouts(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<AffiliatePayout>>>> {
    find_affiliate(&state, id).await?;
    let payouts = AffiliateRepo::list_payouts(&state.pool, id).await?;
    Ok(Json(DataResponse { data: payouts }))
}

/// POST /api/affiliates/{id}/payouts
///
/// Without an explicit amount the payout is the commission earned in the period.
pub async fn create_payout(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreatePayout>,
) -> AppResult<(StatusCode, Json<DataResponse<AffiliatePayout>>)> {
    let range = DateRangeParams {
        from: input.period_start,
        to: input.period_end,
    };
    range.validate()?;
    validate_optional_text("Notes", input.notes.as_deref(), MAX_DESCRIPTION_LENGTH)?;

    let affiliate = find_affiliate(&state, id).await?;
    let amount_cents = match input.amount_cents {
        Some(amount) if amount < 0 => {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Payout amount must not be negative (got {amount})"
            ))));
        }
        Some(amount) => amount,
        None => {
            AffiliateRepo::commission(&state.pool, &affiliate, range.from, range.to)
                .await?
                .commission_cents
        }
    };

    let payout = AffiliateRepo::create_payout(
        &state.pool,
        id,
        input.period_start,
        input.period_end,
        amount_cents,
        input.notes.as_deref(),
    )
    .await?;
    tracing::info!(
        affiliate_id = id,
        payout_id = payout.id,
        amount_cents,
        created_by = admin.user_id,
        "Affiliate payout recorded"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: payout })))
}

/// POST /api/affiliates/{id}/payouts/{payout_id}/paid
pub async fn mark_payout_paid(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path((id, payout_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<AffiliatePayout>>> {
    let payout = AffiliateRepo::mark_payout_paid(&state.pool, id, payout_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Pending payout",
            id: payout_id,
        }))?;
    Ok(Json(DataResponse { data: payout }))
}

async fn find_affiliate(state: &AppState, id: DbId) -> AppResult<Affiliate> {
    AffiliateRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Affiliate",
            id,
        }))
}
