//! RCS template models: the template row and its buttons, variables,
//! analytics, and approval history.

use chrono::NaiveDate;
use msgdesk_core::rcs::ButtonSpec;
use msgdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `rcs_templates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RcsTemplate {
    pub id: DbId,
    pub client_id: DbId,
    pub bot_id: Option<DbId>,
    pub name: String,
    pub template_type: String,
    pub body: String,
    pub card_title: Option<String>,
    pub media_url: Option<String>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `rcs_template_buttons` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RcsTemplateButton {
    pub id: DbId,
    pub template_id: DbId,
    pub button_type: String,
    pub label: String,
    pub value: String,
    pub position: i32,
}

/// A row from the `rcs_template_variables` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RcsTemplateVariable {
    pub id: DbId,
    pub template_id: DbId,
    pub name: String,
    pub sample_value: Option<String>,
    pub position: i32,
}

/// A daily row from the `rcs_template_analytics` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RcsTemplateAnalytics {
    pub id: DbId,
    pub template_id: DbId,
    pub recorded_on: NaiveDate,
    pub sent_count: i64,
    pub delivered_count: i64,
    pub read_count: i64,
    pub clicked_count: i64,
}

/// A row from the `rcs_template_approvals` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RcsTemplateApproval {
    pub id: DbId,
    pub template_id: DbId,
    pub status: String,
    pub notes: Option<String>,
    pub reviewed_by: Option<DbId>,
    pub created_at: Timestamp,
}

/// A template with all of its child rows.
#[derive(Debug, Clone, Serialize)]
pub struct RcsTemplateDetail {
    #[serde(flatten)]
    pub template: RcsTemplate,
    pub buttons: Vec<RcsTemplateButton>,
    pub variables: Vec<RcsTemplateVariable>,
    pub approvals: Vec<RcsTemplateApproval>,
}

/// DTO for creating a template. Variables are derived from the body;
/// `sample_values` supplies optional preview values by variable name.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRcsTemplate {
    pub bot_id: Option<DbId>,
    pub name: String,
    pub template_type: Option<String>,
    pub body: String,
    pub card_title: Option<String>,
    pub media_url: Option<String>,
    #[serde(default)]
    pub buttons: Vec<ButtonSpec>,
    #[serde(default)]
    pub sample_values: std::collections::BTreeMap<String, String>,
}

/// DTO for updating a template. When `buttons` is present the button set is
/// replaced; when `body` changes the variables are re-derived.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRcsTemplate {
    pub bot_id: Option<DbId>,
    pub name: Option<String>,
    pub template_type: Option<String>,
    pub body: Option<String>,
    pub card_title: Option<String>,
    pub media_url: Option<String>,
    pub buttons: Option<Vec<ButtonSpec>>,
    pub sample_values: Option<std::collections::BTreeMap<String, String>>,
}

/// DTO for recording daily delivery counts.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordAnalytics {
    pub recorded_on: Option<NaiveDate>,
    #[serde(default)]
    pub sent_count: i64,
    #[serde(default)]
    pub delivered_count: i64,
    #[serde(default)]
    pub read_count: i64,
    #[serde(default)]
    pub clicked_count: i64,
}
