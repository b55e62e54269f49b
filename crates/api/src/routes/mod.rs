pub mod affiliates;
pub mod auth;
pub mod bots;
pub mod campaigns;
pub mod clients;
pub mod contacts;
pub mod dashboard;
pub mod health;
pub mod plans;
pub mod rcs_templates;
pub mod reports;
pub mod templates;
pub mod wallet;

use axum::Router;
use msgdesk_core::channels::Channel;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login, /auth/refresh                       public
/// /auth/logout, /auth/me                           any signed-in user
///
/// /clients                                         client accounts (super admin)
/// /plans                                           pricing plans
/// /affiliates                                      referral partners (super admin)
/// /wallet                                          balance and ledger
///
/// /contacts                                        address book, CSV import/export
/// /sms/senders                                     SMS sender ids
/// /rcs/bots                                        RCS agents
/// /rcs/templates                                   RCS templates and approvals
/// /templates/variables                             body variable extraction
/// /campaigns                                       wizard, audience, launch
///
/// /reports                                         delivery and spend reports
/// /dashboard/stats                                 headline numbers
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/clients", clients::router())
        .nest("/plans", plans::router())
        .nest("/affiliates", affiliates::router())
        .nest("/wallet", wallet::router())
        .nest("/contacts", contacts::router())
        .nest("/sms/senders", bots::router(Channel::Sms))
        .nest("/rcs/bots", bots::router(Channel::Rcs))
        .nest("/rcs/templates", rcs_templates::router())
        .nest("/templates", templates::router())
        .nest("/campaigns", campaigns::router())
        .nest("/reports", reports::router())
        .nest("/dashboard", dashboard::router())
}
