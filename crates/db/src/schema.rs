//! Bootstrap for the RCS template tables.
//!
//! The five tables are created with `CREATE TABLE IF NOT EXISTS`, in
//! dependency order, every time the server starts. Each table is attempted
//! independently: a failure is logged and recorded in the report, and the
//! remaining tables are still attempted.

use serde::Serialize;
use sqlx::PgPool;

pub const RCS_TEMPLATES: &str = "rcs_templates";
pub const RCS_TEMPLATE_BUTTONS: &str = "rcs_template_buttons";
pub const RCS_TEMPLATE_VARIABLES: &str = "rcs_template_variables";
pub const RCS_TEMPLATE_ANALYTICS: &str = "rcs_template_analytics";
pub const RCS_TEMPLATE_APPROVALS: &str = "rcs_template_approvals";

/// `(table, ddl)` pairs in creation order. Child tables cascade-delete with
/// their parent template.
pub const RCS_TEMPLATE_TABLES: &[(&str, &str)] = &[
    (
        RCS_TEMPLATES,
        "CREATE TABLE IF NOT EXISTS rcs_templates (
            id            BIGSERIAL PRIMARY KEY,
            client_id     BIGINT NOT NULL,
            bot_id        BIGINT,
            name          TEXT NOT NULL,
            template_type TEXT NOT NULL DEFAULT 'text',
            body          TEXT NOT NULL,
            card_title    TEXT,
            media_url     TEXT,
            status        TEXT NOT NULL DEFAULT 'draft',
            created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            CONSTRAINT uq_rcs_templates_client_name UNIQUE (client_id, name),
            CONSTRAINT fk_rcs_templates_client FOREIGN KEY (client_id)
                REFERENCES clients (id) ON DELETE CASCADE,
            CONSTRAINT fk_rcs_templates_bot FOREIGN KEY (bot_id)
                REFERENCES bots (id) ON DELETE SET NULL,
            CONSTRAINT ck_rcs_templates_type
                CHECK (template_type IN ('text', 'rich_card', 'carousel')),
            CONSTRAINT ck_rcs_templates_status
                CHECK (status IN ('draft', 'pending', 'approved', 'rejected'))
        );
        CREATE INDEX IF NOT EXISTS idx_rcs_templates_client_id ON rcs_templates (client_id);",
    ),
    (
        RCS_TEMPLATE_BUTTONS,
        "CREATE TABLE IF NOT EXISTS rcs_template_buttons (
            id          BIGSERIAL PRIMARY KEY,
            template_id BIGINT NOT NULL,
            button_type TEXT NOT NULL,
            label       TEXT NOT NULL,
            value       TEXT NOT NULL,
            position    INTEGER NOT NULL DEFAULT 0,
            CONSTRAINT fk_rcs_template_buttons_template FOREIGN KEY (template_id)
                REFERENCES rcs_templates (id) ON DELETE CASCADE,
            CONSTRAINT ck_rcs_template_buttons_type
                CHECK (button_type IN ('url', 'dial', 'reply'))
        );
        CREATE INDEX IF NOT EXISTS idx_rcs_template_buttons_template_id
            ON rcs_template_buttons (template_id);",
    ),
    (
        RCS_TEMPLATE_VARIABLES,
        "CREATE TABLE IF NOT EXISTS rcs_template_variables (
            id           BIGSERIAL PRIMARY KEY,
            template_id  BIGINT NOT NULL,
            name         TEXT NOT NULL,
            sample_value TEXT,
            position     INTEGER NOT NULL DEFAULT 0,
            CONSTRAINT uq_rcs_template_variables_template_name UNIQUE (template_id, name),
            CONSTRAINT fk_rcs_template_variables_template FOREIGN KEY (template_id)
                REFERENCES rcs_templates (id) ON DELETE CASCADE
        );",
    ),
    (
        RCS_TEMPLATE_ANALYTICS,
        "CREATE TABLE IF NOT EXISTS rcs_template_analytics (
            id              BIGSERIAL PRIMARY KEY,
            template_id     BIGINT NOT NULL,
            recorded_on     DATE NOT NULL DEFAULT CURRENT_DATE,
            sent_count      BIGINT NOT NULL DEFAULT 0,
            delivered_count BIGINT NOT NULL DEFAULT 0,
            read_count      BIGINT NOT NULL DEFAULT 0,
            clicked_count   BIGINT NOT NULL DEFAULT 0,
            CONSTRAINT uq_rcs_template_analytics_template_day UNIQUE (template_id, recorded_on),
            CONSTRAINT fk_rcs_template_analytics_template FOREIGN KEY (template_id)
                REFERENCES rcs_templates (id) ON DELETE CASCADE
        );",
    ),
    (
        RCS_TEMPLATE_APPROVALS,
        "CREATE TABLE IF NOT EXISTS rcs_template_approvals (
            id          BIGSERIAL PRIMARY KEY,
            template_id BIGINT NOT NULL,
            status      TEXT NOT NULL,
            notes       TEXT,
            reviewed_by BIGINT,
            created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            CONSTRAINT fk_rcs_template_approvals_template FOREIGN KEY (template_id)
                REFERENCES rcs_templates (id) ON DELETE CASCADE,
            CONSTRAINT fk_rcs_template_approvals_reviewer FOREIGN KEY (reviewed_by)
                REFERENCES users (id) ON DELETE SET NULL,
            CONSTRAINT ck_rcs_template_approvals_status
                CHECK (status IN ('pending', 'approved', 'rejected'))
        );
        CREATE INDEX IF NOT EXISTS idx_rcs_template_approvals_template_id
            ON rcs_template_approvals (template_id);",
    ),
];

/// A table whose DDL failed during bootstrap.
#[derive(Debug, Clone, Serialize)]
pub struct TableFailure {
    pub table: &'static str,
    pub error: String,
}

/// Outcome of [`bootstrap_rcs_template_schema`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct BootstrapReport {
    /// Tables that exist after the run (created now or already present).
    pub ready: Vec<&'static str>,
    pub failed: Vec<TableFailure>,
}

impl BootstrapReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Create the RCS template tables if they do not exist.
///
/// Never returns an error: each table's failure is logged and collected so
/// the caller can decide whether a partial schema is acceptable.
pub async fn bootstrap_rcs_template_schema(pool: &PgPool) -> BootstrapReport {
    let mut report = BootstrapReport::default();

    for &(table, ddl) in RCS_TEMPLATE_TABLES {
        match sqlx::raw_sql(ddl).execute(pool).await {
            Ok(_) => {
                tracing::info!(table = %table, "RCS template table ready");
                report.ready.push(table);
            }
            Err(e) => {
                tracing::error!(table = %table, error = %e, "Failed to create RCS template table");
                report.failed.push(TableFailure {
                    table,
                    error: e.to_string(),
                });
            }
        }
    }

    report
}

/// RCS template tables that do not exist right now.
pub async fn missing_rcs_tables(pool: &PgPool) -> Result<Vec<&'static str>, sqlx::Error> {
    let mut missing = Vec::new();
    for &(table, _) in RCS_TEMPLATE_TABLES {
        let exists: bool = sqlx::query_scalar("SELECT to_regclass($1) IS NOT NULL")
            .bind(table)
            .fetch_one(pool)
            .await?;
        if !exists {
            missing.push(table);
        }
    }
    Ok(missing)
}
