use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Mounted at `/api/auth`. Login and refresh are public; logout and me
/// need a bearer token.
pub fn router() -> Router<AppState> {
    let public = Router::new()
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh));

    Router::new()
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .merge(public)
}
