//! Route definitions for the `/affiliates` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::affiliates;
use crate::state::AppState;

/// Routes mounted at `/affiliates`. Super admin only.
///
/// ```text
/// GET    /                                -> list
/// POST   /                                -> create
/// GET    /{id}                            -> get_by_id
/// PUT    /{id}                            -> update
/// DELETE /{id}                            -> delete
/// GET    /{id}/commission?from=&to=       -> commission
/// GET    /{id}/payouts                    -> list_payouts
/// POST   /{id}/payouts                    -> create_payout
/// POST   /{id}/payouts/{payout_id}/paid   -> mark_payout_paid
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(affiliates::list).post(affiliates::create))
        .route(
            "/{id}",
            get(affiliates::get_by_id)
                .put(affiliates::update)
                .delete(affiliates::delete),
        )
        .route("/{id}/commission", get(affiliates::commission))
        .route(
            "/{id}/payouts",
            get(affiliates::list_payouts).post(affiliates::create_payout),
        )
        .route(
            "/{id}/payouts/{payout_id}/paid",
            post(affiliates::mark_payout_paid),
        )
}
