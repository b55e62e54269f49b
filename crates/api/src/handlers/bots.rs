//! Handlers for sender identities: RCS bots and SMS sender ids.
//!
//! The same handlers serve both route groups. The channel is fixed per
//! group by an [`Extension<Channel>`] layer.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use msgdesk_core::channels::Channel;
use msgdesk_core::error::CoreError;
use msgdesk_core::types::DbId;
use msgdesk_core::validation::{
    validate_hex_color, validate_optional_text, validate_required_text, validate_url,
    MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH,
};
use msgdesk_db::models::bot::{Bot, CreateBot, UpdateBot};
use msgdesk_db::repositories::BotRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::TenantUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Longest accepted sender id.
const MAX_SENDER_ID_LENGTH: usize = 64;

/// GET /api/rcs/bots, GET /api/sms/senders
pub async fn list(
    user: TenantUser,
    State(state): State<AppState>,
    Extension(channel): Extension<Channel>,
) -> AppResult<Json<DataResponse<Vec<Bot>>>> {
    let bots = BotRepo::list(&state.pool, user.client_id, channel).await?;
    Ok(Json(DataResponse { data: bots }))
}

/// POST /api/rcs/bots, POST /api/sms/senders
pub async fn create(
    user: TenantUser,
    State(state): State<AppState>,
    Extension(channel): Extension<Channel>,
    Json(mut input): Json<CreateBot>,
) -> AppResult<(StatusCode, Json<DataResponse<Bot>>)> {
    validate_required_text("Name", &input.name, MAX_NAME_LENGTH)?;
    input.sender_id = input.sender_id.trim().to_string();
    validate_required_text("Sender id", &input.sender_id, MAX_SENDER_ID_LENGTH)?;
    validate_profile(
        input.description.as_deref(),
        input.logo_url.as_deref(),
        input.brand_color.as_deref(),
        input.webhook_url.as_deref(),
    )?;

    let bot = BotRepo::create(&state.pool, user.client_id, channel, &input).await?;
    tracing::info!(
        bot_id = bot.id,
        client_id = user.client_id,
        channel = %channel,
        "Sender identity created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: bot })))
}

/// GET /api/rcs/bots/{id}, GET /api/sms/senders/{id}
pub async fn get_by_id(
    user: TenantUser,
    State(state): State<AppState>,
    Extension(channel): Extension<Channel>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Bot>>> {
    let bot = BotRepo::find_by_id(&state.pool, user.client_id, channel, id)
        .await?
        .ok_or(not_found(channel, id))?;
    Ok(Json(DataResponse { data: bot }))
}

/// PUT /api/rcs/bots/{id}, PUT /api/sms/senders/{id}
pub async fn update(
    user: TenantUser,
    State(state): State<AppState>,
    Extension(channel): Extension<Channel>,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateBot>,
) -> AppResult<Json<DataResponse<Bot>>> {
    if let Some(name) = &input.name {
        validate_required_text("Name", name, MAX_NAME_LENGTH)?;
    }
    if let Some(sender_id) = input.sender_id.take() {
        let sender_id = sender_id.trim().to_string();
        validate_required_text("Sender id", &sender_id, MAX_SENDER_ID_LENGTH)?;
        input.sender_id = Some(sender_id);
    }
    validate_profile(
        input.description.as_deref(),
        input.logo_url.as_deref(),
        input.brand_color.as_deref(),
        input.webhook_url.as_deref(),
    )?;

    let bot = BotRepo::update(&state.pool, user.client_id, channel, id, &input)
        .await?
        .ok_or(not_found(channel, id))?;
    Ok(Json(DataResponse { data: bot }))
}

/// DELETE /api/rcs/bots/{id}, DELETE /api/sms/senders/{id}
pub async fn delete(
    user: TenantUser,
    State(state): State<AppState>,
    Extension(channel): Extension<Channel>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if BotRepo::delete(&state.pool, user.client_id, channel, id).await? {
        tracing::info!(bot_id = id, client_id = user.client_id, "Sender identity deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(channel, id))
    }
}

fn validate_profile(
    description: Option<&str>,
    logo_url: Option<&str>,
    brand_color: Option<&str>,
    webhook_url: Option<&str>,
) -> Result<(), CoreError> {
    validate_optional_text("Description", description, MAX_DESCRIPTION_LENGTH)?;
    if let Some(url) = logo_url {
        validate_url("Logo URL", url)?;
    }
    if let Some(color) = brand_color {
        validate_hex_color(color)?;
    }
    if let Some(url) = webhook_url {
        validate_url("Webhook URL", url)?;
    }
    Ok(())
}

fn not_found(channel: Channel, id: DbId) -> AppError {
    let entity = match channel {
        Channel::Sms => "Sender",
        _ => "Bot",
    };
    AppError::Core(CoreError::NotFound { entity, id })
}
