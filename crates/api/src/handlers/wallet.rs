//! Wallet handlers.
//!
//! Client users read their own balance and ledger; super admins read any
//! client's wallet and credit top-ups.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use msgdesk_core::error::CoreError;
use msgdesk_core::types::DbId;
use msgdesk_core::validation::{validate_optional_text, MAX_DESCRIPTION_LENGTH};
use msgdesk_core::wallet::{validate_amount, TransactionKind};
use msgdesk_db::models::wallet::{CreditWallet, Wallet, WalletTransaction};
use msgdesk_db::repositories::wallet_repo::LedgerEntry;
use msgdesk_db::repositories::WalletRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireSuperAdmin, TenantUser};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/wallet
pub async fn get_own(
    user: TenantUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Wallet>>> {
    let wallet = find_wallet(&state, user.client_id).await?;
    Ok(Json(DataResponse { data: wallet }))
}

/// GET /api/wallet/transactions
pub async fn list_own_transactions(
    user: TenantUser,
    State(state): State<AppState>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<WalletTransaction>>>> {
    let (limit, offset) = page.clamped();
    let rows = WalletRepo::list_transactions(&state.pool, user.client_id, limit, offset).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// GET /api/wallet/clients/{client_id}
pub async fn get_for_client(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(client_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Wallet>>> {
    let wallet = find_wallet(&state, client_id).await?;
    Ok(Json(DataResponse { data: wallet }))
}

/// GET /api/wallet/clients/{client_id}/transactions
pub async fn list_client_transactions(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(client_id): Path<DbId>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<WalletTransaction>>>> {
    find_wallet(&state, client_id).await?;
    let (limit, offset) = page.clamped();
    let rows = WalletRepo::list_transactions(&state.pool, client_id, limit, offset).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// POST /api/wallet/clients/{client_id}/credit
pub async fn credit(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(client_id): Path<DbId>,
    Json(input): Json<CreditWallet>,
) -> AppResult<(StatusCode, Json<DataResponse<WalletTransaction>>)> {
    validate_amount(input.amount_cents)?;
    validate_optional_text("Description", input.description.as_deref(), MAX_DESCRIPTION_LENGTH)?;
    find_wallet(&state, client_id).await?;

    let entry = LedgerEntry {
        kind: TransactionKind::Credit,
        amount_cents: input.amount_cents,
        description: Some(input.description.as_deref().unwrap_or("Wallet top-up")),
        campaign_id: None,
        created_by: Some(admin.user_id),
    };
    let row = WalletRepo::record(&state.pool, client_id, &entry).await?;

    tracing::info!(
        client_id,
        amount_cents = input.amount_cents,
        balance_after_cents = row.balance_after_cents,
        credited_by = admin.user_id,
        "Wallet credited"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: row })))
}

async fn find_wallet(state: &AppState, client_id: DbId) -> AppResult<Wallet> {
    WalletRepo::find_by_client(&state.pool, client_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Wallet for client",
            id: client_id,
        }))
}
