//! Route definitions for the `/reports` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::reports;
use crate::state::AppState;

/// Routes mounted at `/reports`.
///
/// ```text
/// GET /campaigns                 -> campaigns
/// GET /campaigns/{id}/delivery   -> delivery
/// GET /spend?from=&to=           -> spend
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/campaigns", get(reports::campaigns))
        .route("/campaigns/{id}/delivery", get(reports::delivery))
        .route("/spend", get(reports::spend))
}
