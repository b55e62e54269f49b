//! Handlers for the `/rcs/templates` resource: authoring, the approval
//! workflow, previews and daily analytics.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use msgdesk_core::channels::Channel;
use msgdesk_core::error::CoreError;
use msgdesk_core::rcs::{
    validate_buttons, validate_template, ReviewDecision, TemplateStatus, TemplateType,
};
use msgdesk_core::template::{extract_variables, render};
use msgdesk_core::types::DbId;
use msgdesk_core::validation::{
    validate_optional_text, validate_required_text, MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH,
};
use msgdesk_db::models::rcs_template::{
    CreateRcsTemplate, RcsTemplate, RcsTemplateAnalytics, RcsTemplateButton, RcsTemplateDetail,
    RecordAnalytics, UpdateRcsTemplate,
};
use msgdesk_db::repositories::{BotRepo, RcsTemplateRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireSuperAdmin, TenantUser};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TemplateListParams {
    pub status: Option<String>,
}

/// Request body for `POST /rcs/templates/{id}/review`.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub decision: ReviewDecision,
    /// Required when rejecting.
    pub notes: Option<String>,
}

/// Request body for `POST /rcs/templates/{id}/preview`. Values override the
/// stored sample values.
#[derive(Debug, Default, Deserialize)]
pub struct PreviewRequest {
    #[serde(default)]
    pub values: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct TemplatePreview {
    pub template_type: String,
    pub card_title: Option<String>,
    pub body: String,
    pub media_url: Option<String>,
    pub buttons: Vec<RcsTemplateButton>,
    /// Variables that had neither a supplied nor a sample value.
    pub missing_variables: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsParams {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// GET /api/rcs/templates?status=
pub async fn list(
    user: TenantUser,
    State(state): State<AppState>,
    Query(params): Query<TemplateListParams>,
) -> AppResult<Json<DataResponse<Vec<RcsTemplate>>>> {
    let status = params
        .status
        .as_deref()
        .map(str::parse::<TemplateStatus>)
        .transpose()?;
    let templates = RcsTemplateRepo::list(&state.pool, user.client_id, status).await?;
    Ok(Json(DataResponse { data: templates }))
}

/// POST /api/rcs/templates
pub async fn create(
    user: TenantUser,
    State(state): State<AppState>,
    Json(input): Json<CreateRcsTemplate>,
) -> AppResult<(StatusCode, Json<DataResponse<RcsTemplateDetail>>)> {
    validate_required_text("Template name", &input.name, MAX_NAME_LENGTH)?;
    let template_type = match input.template_type.as_deref() {
        Some(raw) => raw.parse::<TemplateType>()?,
        None => TemplateType::Text,
    };
    validate_template(
        template_type,
        &input.body,
        input.card_title.as_deref(),
        input.media_url.as_deref(),
    )?;
    validate_buttons(&input.buttons)?;
    if let Some(bot_id) = input.bot_id {
        ensure_rcs_bot(&state, user.client_id, bot_id).await?;
    }

    let template =
        RcsTemplateRepo::create(&state.pool, user.client_id, template_type, &input).await?;
    tracing::info!(
        template_id = template.id,
        client_id = user.client_id,
        template_type = %template_type,
        "RCS template created"
    );
    let detail = RcsTemplateRepo::detail(&state.pool, template).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: detail })))
}

/// GET /api/rcs/templates/{id}
pub async fn get_by_id(
    user: TenantUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<RcsTemplateDetail>>> {
    let template = find_template(&state, user.client_id, id).await?;
    let detail = RcsTemplateRepo::detail(&state.pool, template).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// PUT /api/rcs/templates/{id}
///
/// Any edit returns the template to `draft`. Templates awaiting review are
/// locked.
pub async fn update(
    user: TenantUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRcsTemplate>,
) -> AppResult<Json<DataResponse<RcsTemplateDetail>>> {
    let current = find_template(&state, user.client_id, id).await?;
    if current.status.parse::<TemplateStatus>()? == TemplateStatus::Pending {
        return Err(AppError::Core(CoreError::Conflict(
            "Template is awaiting review and cannot be edited".into(),
        )));
    }

    if let Some(name) = &input.name {
        validate_required_text("Template name", name, MAX_NAME_LENGTH)?;
    }
    let new_type = input
        .template_type
        .as_deref()
        .map(str::parse::<TemplateType>)
        .transpose()?;
    let effective_type = match new_type {
        Some(t) => t,
        None => current.template_type.parse()?,
    };
    validate_template(
        effective_type,
        input.body.as_deref().unwrap_or(&current.body),
        input.card_title.as_deref().or(current.card_title.as_deref()),
        input.media_url.as_deref().or(current.media_url.as_deref()),
    )?;
    if let Some(buttons) = &input.buttons {
        validate_buttons(buttons)?;
    }
    if let Some(bot_id) = input.bot_id {
        ensure_rcs_bot(&state, user.client_id, bot_id).await?;
    }

    let Some(template) =
        RcsTemplateRepo::update(&state.pool, user.client_id, id, new_type, &input).await?
    else {
        // Deleted or submitted since the check above.
        find_template(&state, user.client_id, id).await?;
        return Err(AppError::Core(CoreError::Conflict(
            "Template is awaiting review and cannot be edited".into(),
        )));
    };
    let detail = RcsTemplateRepo::detail(&state.pool, template).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// DELETE /api/rcs/templates/{id}
pub async fn delete(
    user: TenantUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if RcsTemplateRepo::delete(&state.pool, user.client_id, id).await? {
        tracing::info!(template_id = id, client_id = user.client_id, "RCS template deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "RCS template",
            id,
        }))
    }
}

/// POST /api/rcs/templates/{id}/submit
pub async fn submit(
    user: TenantUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<RcsTemplate>>> {
    let template = find_template(&state, user.client_id, id).await?;
    let status: TemplateStatus = template.status.parse()?;
    if !status.can_submit() {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "A {status} template cannot be submitted for review"
        ))));
    }

    let updated = RcsTemplateRepo::change_status(
        &state.pool,
        id,
        status,
        TemplateStatus::Pending,
        None,
        Some(user.user_id),
    )
    .await?
    .ok_or_else(|| status_changed(id))?;

    tracing::info!(template_id = id, client_id = user.client_id, "RCS template submitted");
    Ok(Json(DataResponse { data: updated }))
}

/// POST /api/rcs/templates/{id}/review
pub async fn review(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ReviewRequest>,
) -> AppResult<Json<DataResponse<RcsTemplate>>> {
    let notes = input
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());
    validate_optional_text("Notes", notes, MAX_DESCRIPTION_LENGTH)?;
    if input.decision == ReviewDecision::Reject && notes.is_none() {
        return Err(AppError::Core(CoreError::Validation(
            "Notes are required when rejecting a template".into(),
        )));
    }

    let template = RcsTemplateRepo::find_any(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "RCS template",
            id,
        }))?;
    let status: TemplateStatus = template.status.parse()?;
    if !status.can_review() {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Only pending templates can be reviewed (template is {status})"
        ))));
    }

    let outcome = input.decision.resulting_status();
    let updated = RcsTemplateRepo::change_status(
        &state.pool,
        id,
        status,
        outcome,
        notes,
        Some(admin.user_id),
    )
    .await?
    .ok_or_else(|| status_changed(id))?;

    tracing::info!(
        template_id = id,
        reviewed_by = admin.user_id,
        outcome = %outcome,
        "RCS template reviewed"
    );
    Ok(Json(DataResponse { data: updated }))
}

/// POST /api/rcs/templates/{id}/preview
pub async fn preview(
    user: TenantUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<PreviewRequest>,
) -> AppResult<Json<DataResponse<TemplatePreview>>> {
    let template = find_template(&state, user.client_id, id).await?;
    let detail = RcsTemplateRepo::detail(&state.pool, template).await?;

    let mut values: HashMap<String, String> = detail
        .variables
        .iter()
        .filter_map(|v| v.sample_value.clone().map(|s| (v.name.clone(), s)))
        .collect();
    values.extend(input.values);

    let missing_variables = extract_variables(&detail.template.body)
        .into_iter()
        .filter(|name| !values.contains_key(name))
        .collect();

    Ok(Json(DataResponse {
        data: TemplatePreview {
            template_type: detail.template.template_type,
            card_title: detail.template.card_title.as_deref().map(|t| render(t, &values)),
            body: render(&detail.template.body, &values),
            media_url: detail.template.media_url,
            buttons: detail.buttons,
            missing_variables,
        },
    }))
}

/// GET /api/rcs/templates/{id}/analytics?from=&to=
pub async fn list_analytics(
    user: TenantUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<AnalyticsParams>,
) -> AppResult<Json<DataResponse<Vec<RcsTemplateAnalytics>>>> {
    find_template(&state, user.client_id, id).await?;
    let rows = RcsTemplateRepo::list_analytics(&state.pool, id, params.from, params.to).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// POST /api/rcs/templates/{id}/analytics
///
/// Counts are added to the day's existing totals.
pub async fn record_analytics(
    user: TenantUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<RecordAnalytics>,
) -> AppResult<(StatusCode, Json<DataResponse<RcsTemplateAnalytics>>)> {
    let counts = [
        ("sent_count", input.sent_count),
        ("delivered_count", input.delivered_count),
        ("read_count", input.read_count),
        ("clicked_count", input.clicked_count),
    ];
    if let Some((field, value)) = counts.iter().find(|(_, v)| *v < 0) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "{field} must not be negative (got {value})"
        ))));
    }

    find_template(&state, user.client_id, id).await?;
    let row = RcsTemplateRepo::record_analytics(&state.pool, id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: row })))
}

async fn find_template(state: &AppState, client_id: DbId, id: DbId) -> AppResult<RcsTemplate> {
    RcsTemplateRepo::find_by_id(&state.pool, client_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "RCS template",
            id,
        }))
}

async fn ensure_rcs_bot(state: &AppState, client_id: DbId, bot_id: DbId) -> AppResult<()> {
    BotRepo::find_by_id(&state.pool, client_id, Channel::Rcs, bot_id)
        .await?
        .map(|_| ())
        .ok_or(AppError::Core(CoreError::Validation(format!(
            "RCS bot {bot_id} does not exist"
        ))))
}

fn status_changed(id: DbId) -> AppError {
    AppError::Core(CoreError::Conflict(format!(
        "RCS template {id} changed status concurrently; reload and retry"
    )))
}
