//! Handlers for the `/clients` resource (super admin only).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use msgdesk_core::error::CoreError;
use msgdesk_core::roles::ROLE_CLIENT_ADMIN;
use msgdesk_core::types::DbId;
use msgdesk_core::validation::{
    validate_email, validate_optional_text, validate_phone, validate_required_text,
    MAX_NAME_LENGTH,
};
use msgdesk_db::models::client::{Client, ClientOverview, CreateClient, UpdateClient};
use msgdesk_db::models::user::{CreateUser, UserResponse};
use msgdesk_db::repositories::{ClientRepo, RoleRepo, SessionRepo, UserRepo};
use serde::Deserialize;

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireSuperAdmin;
use crate::query::{PaginationParams, SearchParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /clients/{id}/users`.
#[derive(Debug, Deserialize)]
pub struct CreateClientUser {
    pub username: String,
    pub email: String,
    pub password: String,
    /// `client_admin` (default) or `agent`.
    pub role: Option<String>,
}

/// GET /api/clients
pub async fn list(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Query(search): Query<SearchParams>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<ClientOverview>>>> {
    let (limit, offset) = page.clamped();
    let clients =
        ClientRepo::list_overview(&state.pool, search.term(), limit, offset).await?;
    Ok(Json(DataResponse { data: clients }))
}

/// POST /api/clients
///
/// Creates the client together with its empty wallet.
pub async fn create(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Json(mut input): Json<CreateClient>,
) -> AppResult<(StatusCode, Json<DataResponse<Client>>)> {
    validate_required_text("Client name", &input.name, MAX_NAME_LENGTH)?;
    validate_optional_text("Company name", input.company_name.as_deref(), MAX_NAME_LENGTH)?;
    input.email = validate_email(&input.email)?;
    input.phone = input.phone.as_deref().map(validate_phone).transpose()?;

    let client = ClientRepo::create(&state.pool, &input).await?;
    tracing::info!(client_id = client.id, created_by = admin.user_id, "Client created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: client })))
}

/// GET /api/clients/{id}
pub async fn get_by_id(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Client>>> {
    let client = find_client(&state, id).await?;
    Ok(Json(DataResponse { data: client }))
}

/// PUT /api/clients/{id}
pub async fn update(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateClient>,
) -> AppResult<Json<DataResponse<Client>>> {
    if let Some(name) = &input.name {
        validate_required_text("Client name", name, MAX_NAME_LENGTH)?;
    }
    validate_optional_text("Company name", input.company_name.as_deref(), MAX_NAME_LENGTH)?;
    input.email = input.email.as_deref().map(validate_email).transpose()?;
    input.phone = input.phone.as_deref().map(validate_phone).transpose()?;

    let client = ClientRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Client",
            id,
        }))?;
    Ok(Json(DataResponse { data: client }))
}

/// DELETE /api/clients/{id}
///
/// Deactivates the client; its data is kept.
pub async fn deactivate(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if ClientRepo::deactivate(&state.pool, id).await? {
        let revoked = SessionRepo::revoke_all_for_client(&state.pool, id).await?;
        tracing::info!(
            client_id = id,
            deactivated_by = admin.user_id,
            revoked_sessions = revoked,
            "Client deactivated"
        );
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Client",
            id,
        }))
    }
}

/// GET /api/clients/{id}/users
pub async fn list_users(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    find_client(&state, id).await?;

    let roles = RoleRepo::names(&state.pool).await?;
    let users = UserRepo::list_by_client(&state.pool, id)
        .await?
        .iter()
        .map(|u| {
            let role = roles.get(&u.role_id).map_or("unknown", String::as_str);
            UserResponse::from_user(u, role)
        })
        .collect();
    Ok(Json(DataResponse { data: users }))
}

/// POST /api/clients/{id}/users
pub async fn create_user(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateClientUser>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    find_client(&state, id).await?;

    let username = input.username.trim();
    validate_required_text("Username", username, MAX_NAME_LENGTH)?;
    let email = validate_email(&input.email)?;
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let role_name = input.role.as_deref().unwrap_or(ROLE_CLIENT_ADMIN);
    let role = RoleRepo::find_by_name(&state.pool, role_name)
        .await?
        .filter(|r| r.is_client_role())
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "Role '{role_name}' cannot be assigned to a client user"
            )))
        })?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            client_id: Some(id),
            role_id: role.id,
            username: username.to_string(),
            email,
            password_hash,
        },
    )
    .await?;

    tracing::info!(
        user_id = user.id,
        client_id = id,
        created_by = admin.user_id,
        "Client user created"
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserResponse::from_user(&user, role.name),
        }),
    ))
}

async fn find_client(state: &AppState, id: DbId) -> AppResult<Client> {
    ClientRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Client",
            id,
        }))
}
