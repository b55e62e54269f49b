//! Route definitions for the `/rcs/templates` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::rcs_templates;
use crate::state::AppState;

/// Routes mounted at `/rcs/templates`.
///
/// ```text
/// GET    /                  -> list (?status=)
/// POST   /                  -> create
/// GET    /{id}              -> get_by_id
/// PUT    /{id}              -> update
/// DELETE /{id}              -> delete
/// POST   /{id}/submit       -> submit
/// POST   /{id}/review       -> review (super admin)
/// POST   /{id}/preview      -> preview
/// GET    /{id}/analytics    -> list_analytics (?from=&to=)
/// POST   /{id}/analytics    -> record_analytics
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(rcs_templates::list).post(rcs_templates::create))
        .route(
            "/{id}",
            get(rcs_templates::get_by_id)
                .put(rcs_templates::update)
                .delete(rcs_templates::delete),
        )
        .route("/{id}/submit", post(rcs_templates::submit))
        .route("/{id}/review", post(rcs_templates::review))
        .route("/{id}/preview", post(rcs_templates::preview))
        .route(
            "/{id}/analytics",
            get(rcs_templates::list_analytics).post(rcs_templates::record_analytics),
        )
}
