use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use msgdesk_api::auth::password::hash_password;
use msgdesk_api::config::{AdminSeed, ServerConfig};
use msgdesk_api::router::build_app_router;
use msgdesk_api::state::AppState;
use msgdesk_core::roles::ROLE_SUPER_ADMIN;
use msgdesk_db::models::user::CreateUser;
use msgdesk_db::repositories::{CampaignRepo, RoleRepo, UserRepo};
use msgdesk_db::DbPool;

/// How often scheduled campaigns are checked for a due start time.
const SCHEDULER_INTERVAL: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "msgdesk_api=debug,msgdesk_db=info,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = msgdesk_db::create_pool(&database_url, config.db_max_connections)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    msgdesk_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    msgdesk_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    let report = msgdesk_db::bootstrap_rcs_template_schema(&pool).await;
    if report.is_complete() {
        tracing::info!(tables = report.ready.len(), "RCS template schema ready");
    } else {
        tracing::warn!(
            ready = report.ready.len(),
            failed = report.failed.len(),
            "RCS template schema is incomplete; template endpoints may fail"
        );
    }

    if let Some(seed) = &config.admin_seed {
        if let Err(e) = seed_super_admin(&pool, seed).await {
            tracing::error!(error = %e, "Failed to seed super admin");
        }
    }

    // --- Scheduler ---
    let scheduler_handle = tokio::spawn(run_campaign_scheduler(pool.clone()));

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    scheduler_handle.abort();
    tracing::info!("Graceful shutdown complete");
}

/// Create the configured super admin unless one already exists.
async fn seed_super_admin(pool: &DbPool, seed: &AdminSeed) -> Result<(), String> {
    let role = RoleRepo::find_by_name(pool, ROLE_SUPER_ADMIN)
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("Role '{ROLE_SUPER_ADMIN}' is missing"))?;

    if UserRepo::exists_with_role(pool, role.id)
        .await
        .map_err(|e| e.to_string())?
    {
        tracing::debug!("Super admin already present, skipping seed");
        return Ok(());
    }

    let password_hash = hash_password(&seed.password).map_err(|e| e.to_string())?;
    let user = UserRepo::create(
        pool,
        &CreateUser {
            client_id: None,
            role_id: role.id,
            username: seed.username.clone(),
            email: seed.email.clone(),
            password_hash,
        },
    )
    .await
    .map_err(|e| e.to_string())?;

    tracing::info!(user_id = user.id, username = %user.username, "Seeded super admin");
    Ok(())
}

/// Move scheduled campaigns whose start time has passed to `running`.
async fn run_campaign_scheduler(pool: DbPool) {
    let mut interval = tokio::time::interval(SCHEDULER_INTERVAL);
    loop {
        interval.tick().await;
        match CampaignRepo::start_due(&pool).await {
            Ok(0) => {}
            Ok(started) => tracing::info!(started, "Started scheduled campaigns"),
            Err(e) => tracing::error!(error = %e, "Failed to start scheduled campaigns"),
        }
    }
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
