//! Route definitions for the `/templates` helpers.

use axum::routing::post;
use axum::Router;

use crate::handlers::templates;
use crate::state::AppState;

/// Routes mounted at `/templates`.
///
/// ```text
/// POST /variables -> variables
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/variables", post(templates::variables))
}
