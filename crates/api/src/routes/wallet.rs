//! Route definitions for the `/wallet` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::wallet;
use crate::state::AppState;

/// Routes mounted at `/wallet`.
///
/// ```text
/// GET  /                                    -> get_own (tenant)
/// GET  /transactions                        -> list_own_transactions (tenant)
/// GET  /clients/{client_id}                 -> get_for_client (super admin)
/// GET  /clients/{client_id}/transactions    -> list_client_transactions (super admin)
/// POST /clients/{client_id}/credit          -> credit (super admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(wallet::get_own))
        .route("/transactions", get(wallet::list_own_transactions))
        .route("/clients/{client_id}", get(wallet::get_for_client))
        .route(
            "/clients/{client_id}/transactions",
            get(wallet::list_client_transactions),
        )
        .route("/clients/{client_id}/credit", post(wallet::credit))
}
