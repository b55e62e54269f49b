//! Route definitions for the `/campaigns` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::campaigns;
use crate::state::AppState;

/// Routes mounted at `/campaigns`.
///
/// ```text
/// GET    /                                      -> list (?status=&limit=&offset=)
/// POST   /                                      -> create
/// GET    /{id}                                  -> get_by_id
/// PUT    /{id}                                  -> update (draft only)
/// DELETE /{id}                                  -> delete (draft only)
/// PUT    /{id}/audience                         -> set_audience
/// POST   /{id}/audience/csv                     -> upload_audience_csv (multipart `file`)
/// POST   /{id}/preview                          -> preview
/// GET    /{id}/estimate                         -> estimate
/// POST   /{id}/advance                          -> advance (wizard step gate)
/// POST   /{id}/launch                           -> launch
/// POST   /{id}/cancel                           -> cancel
/// POST   /{id}/complete                         -> complete
/// GET    /{id}/recipients                       -> list_recipients
/// PUT    /{id}/recipients/{recipient_id}/status -> update_recipient_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(campaigns::list).post(campaigns::create))
        .route(
            "/{id}",
            get(campaigns::get_by_id)
                .put(campaigns::update)
                .delete(campaigns::delete),
        )
        .route("/{id}/audience", put(campaigns::set_audience))
        .route("/{id}/audience/csv", post(campaigns::upload_audience_csv))
        .route("/{id}/preview", post(campaigns::preview))
        .route("/{id}/estimate", get(campaigns::estimate))
        .route("/{id}/advance", post(campaigns::advance))
        .route("/{id}/launch", post(campaigns::launch))
        .route("/{id}/cancel", post(campaigns::cancel))
        .route("/{id}/complete", post(campaigns::complete))
        .route("/{id}/recipients", get(campaigns::list_recipients))
        .route(
            "/{id}/recipients/{recipient_id}/status",
            put(campaigns::update_recipient_status),
        )
}
