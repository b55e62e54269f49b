use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use msgdesk_core::error::CoreError;
use msgdesk_db::RepoError;
use serde_json::json;

/// Error returned by every handler. Rendered as `{ "error", "code" }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Malformed request that never reached domain validation, such as a
    /// broken multipart upload.
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Database(e) => AppError::Database(e),
            RepoError::Domain(e) => AppError::Core(e),
        }
    }
}

/// Status, machine code and client-facing message for one error.
struct Rendered {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl Rendered {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// Details go to the log only.
    fn internal(detail: &dyn std::fmt::Display) -> Self {
        tracing::error!(error = %detail, "Request failed");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "An internal error occurred",
        )
    }
}

fn render_core(err: &CoreError) -> Rendered {
    match err {
        CoreError::NotFound { entity, id } => Rendered::new(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => Rendered::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
        CoreError::Conflict(msg) => Rendered::new(StatusCode::CONFLICT, "CONFLICT", msg),
        CoreError::Unauthorized(msg) => Rendered::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
        CoreError::Forbidden(msg) => Rendered::new(StatusCode::FORBIDDEN, "FORBIDDEN", msg),
        CoreError::InsufficientFunds { .. } => Rendered::new(
            StatusCode::PAYMENT_REQUIRED,
            "INSUFFICIENT_FUNDS",
            err.to_string(),
        ),
        CoreError::Internal(msg) => Rendered::internal(msg),
    }
}

/// What a duplicate on a unique constraint means to a console user.
fn duplicate_message(constraint: &str) -> String {
    let what = match constraint {
        "uq_clients_email" => "A client with this email already exists",
        "uq_users_username" => "That username is taken",
        "uq_users_email" => "A user with this email already exists",
        "uq_plans_name" => "A plan with this name already exists",
        "uq_affiliates_email" => "An affiliate with this email already exists",
        "uq_affiliates_referral_code" => "That referral code is already in use",
        "uq_contacts_client_phone" => "A contact with this phone number already exists",
        "uq_bots_client_channel_sender" => "A sender with this id already exists on this channel",
        "uq_rcs_templates_client_name" => "A template with this name already exists",
        other => return format!("Duplicate value violates unique constraint: {other}"),
    };
    what.to_string()
}

fn render_sqlx(err: &sqlx::Error) -> Rendered {
    let sqlx::Error::Database(db_err) = err else {
        return match err {
            sqlx::Error::RowNotFound => {
                Rendered::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Resource not found")
            }
            other => Rendered::internal(other),
        };
    };

    let constraint = db_err.constraint().unwrap_or_default();
    match db_err.code().as_deref() {
        // unique_violation
        Some("23505") if constraint.starts_with("uq_") => {
            Rendered::new(StatusCode::CONFLICT, "CONFLICT", duplicate_message(constraint))
        }
        // foreign_key_violation
        Some("23503") if constraint.starts_with("fk_") => Rendered::new(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            format!("Referenced record does not exist: {constraint}"),
        ),
        _ => Rendered::internal(db_err),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let rendered = match &self {
            AppError::Core(core) => render_core(core),
            AppError::Database(err) => render_sqlx(err),
            AppError::BadRequest(msg) => Rendered::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            AppError::InternalError(msg) => Rendered::internal(msg),
        };

        let body = Json(json!({
            "error": rendered.message,
            "code": rendered.code,
        }));
        (rendered.status, body).into_response()
    }
}
