//! Route definitions for the `/contacts` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::contacts;
use crate::state::AppState;

/// Routes mounted at `/contacts`.
///
/// ```text
/// GET    /          -> list (?search=&limit=&offset=)
/// POST   /          -> create
/// POST   /import    -> import_csv (multipart `file`)
/// GET    /export    -> export_csv (text/csv)
/// GET    /{id}      -> get_by_id
/// PUT    /{id}      -> update
/// DELETE /{id}      -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(contacts::list).post(contacts::create))
        .route("/import", post(contacts::import_csv))
        .route("/export", get(contacts::export_csv))
        .route(
            "/{id}",
            get(contacts::get_by_id)
                .put(contacts::update)
                .delete(contacts::delete),
        )
}
