//! Route definitions for sender identities (`/rcs/bots`, `/sms/senders`).

use axum::routing::get;
use axum::{Extension, Router};
use msgdesk_core::channels::Channel;

use crate::handlers::bots;
use crate::state::AppState;

/// Routes for the sender identities of one `channel`.
///
/// ```text
/// GET    /       -> list
/// POST   /       -> create
/// GET    /{id}   -> get_by_id
/// PUT    /{id}   -> update
/// DELETE /{id}   -> delete
/// ```
pub fn router(channel: Channel) -> Router<AppState> {
    Router::new()
        .route("/", get(bots::list).post(bots::create))
        .route(
            "/{id}",
            get(bots::get_by_id)
                .put(bots::update)
                .delete(bots::delete),
        )
        .layer(Extension(channel))
}
