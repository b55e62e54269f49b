//! Handlers for the `/contacts` resource, including CSV import and export.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use msgdesk_core::audience::ContactFilter;
use msgdesk_core::contacts_csv::{
    build_contacts_csv, parse_contacts_csv, ExportContact, ParsedCsv, RejectedRow,
};
use msgdesk_core::error::CoreError;
use msgdesk_core::types::DbId;
use msgdesk_core::validation::{
    validate_email, validate_optional_text, validate_phone, MAX_NAME_LENGTH,
};
use msgdesk_db::models::contact::{Contact, CreateContact, UpdateContact};
use msgdesk_db::repositories::ContactRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::TenantUser;
use crate::query::{PaginationParams, SearchParams};
use crate::response::{DataResponse, Page};
use crate::state::AppState;

/// Multipart field that carries an uploaded CSV.
const CSV_FIELD: &str = "file";

/// Outcome of `POST /contacts/import`.
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub inserted: u64,
    pub updated: u64,
    pub rejected: Vec<RejectedRow>,
}

/// GET /api/contacts?search=&limit=&offset=
pub async fn list(
    user: TenantUser,
    State(state): State<AppState>,
    Query(search): Query<SearchParams>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Page<Contact>>>> {
    let filter = ContactFilter {
        search: search.term().map(str::to_string),
    };
    let (limit, offset) = page.clamped();
    let items = ContactRepo::list(&state.pool, user.client_id, &filter, limit, offset).await?;
    let total = ContactRepo::count(&state.pool, user.client_id, &filter).await?;
    Ok(Json(DataResponse {
        data: Page {
            items,
            total,
            limit,
            offset,
        },
    }))
}

/// POST /api/contacts
pub async fn create(
    user: TenantUser,
    State(state): State<AppState>,
    Json(mut input): Json<CreateContact>,
) -> AppResult<(StatusCode, Json<DataResponse<Contact>>)> {
    input.phone = validate_phone(&input.phone)?;
    input.email = input.email.as_deref().map(validate_email).transpose()?;
    validate_optional_text("Name", input.name.as_deref(), MAX_NAME_LENGTH)?;

    let contact = ContactRepo::create(&state.pool, user.client_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: contact })))
}

/// GET /api/contacts/{id}
pub async fn get_by_id(
    user: TenantUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Contact>>> {
    let contact = ContactRepo::find_by_id(&state.pool, user.client_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Contact",
            id,
        }))?;
    Ok(Json(DataResponse { data: contact }))
}

/// PUT /api/contacts/{id}
pub async fn update(
    user: TenantUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateContact>,
) -> AppResult<Json<DataResponse<Contact>>> {
    input.phone = input.phone.as_deref().map(validate_phone).transpose()?;
    input.email = input.email.as_deref().map(validate_email).transpose()?;
    validate_optional_text("Name", input.name.as_deref(), MAX_NAME_LENGTH)?;

    let contact = ContactRepo::update(&state.pool, user.client_id, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Contact",
            id,
        }))?;
    Ok(Json(DataResponse { data: contact }))
}

/// DELETE /api/contacts/{id}
pub async fn delete(
    user: TenantUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if ContactRepo::delete(&state.pool, user.client_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Contact",
            id,
        }))
    }
}

/// POST /api/contacts/import
///
/// Multipart upload with a `file` field. Rows are upserted by phone number;
/// malformed rows are reported back and skipped.
pub async fn import_csv(
    user: TenantUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<ImportResponse>>> {
    let parsed = read_csv_upload(multipart).await?;
    let summary = ContactRepo::upsert_rows(&state.pool, user.client_id, &parsed.rows).await?;

    tracing::info!(
        client_id = user.client_id,
        inserted = summary.inserted,
        updated = summary.updated,
        rejected = parsed.rejected.len(),
        "Contacts imported"
    );
    Ok(Json(DataResponse {
        data: ImportResponse {
            inserted: summary.inserted,
            updated: summary.updated,
            rejected: parsed.rejected,
        },
    }))
}

/// GET /api/contacts/export
pub async fn export_csv(
    user: TenantUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let contacts = ContactRepo::list_all(&state.pool, user.client_id).await?;
    let rows: Vec<ExportContact<'_>> = contacts
        .iter()
        .map(|c| ExportContact {
            name: c.name.as_deref(),
            phone: &c.phone,
            email: c.email.as_deref(),
            attributes: &c.attributes.0,
        })
        .collect();
    let csv = build_contacts_csv(&rows)?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"contacts.csv\"",
            ),
        ],
        csv,
    ))
}

/// Read the `file` field of a multipart upload and parse it as a contact CSV.
pub(crate) async fn read_csv_upload(mut multipart: Multipart) -> AppResult<ParsedCsv> {
    let mut data: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() == Some(CSV_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            data = Some(bytes.to_vec());
        }
    }

    let data = data
        .ok_or_else(|| AppError::BadRequest(format!("Missing required '{CSV_FIELD}' field")))?;
    let text = String::from_utf8(data)
        .map_err(|_| AppError::BadRequest("CSV file must be UTF-8 encoded".into()))?;

    Ok(parse_contacts_csv(&text)?)
}
