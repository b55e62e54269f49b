//! Campaign and campaign recipient models.

use msgdesk_core::campaign::CampaignStatus;
use msgdesk_core::template::VariableMapping;
use msgdesk_core::types::{Cents, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A campaign row from the `campaigns` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Campaign {
    pub id: DbId,
    pub client_id: DbId,
    pub name: String,
    pub channel: String,
    pub bot_id: Option<DbId>,
    pub template_id: Option<DbId>,
    pub body: Option<String>,
    pub variable_mapping: Json<VariableMapping>,
    pub status: String,
    pub audience_count: i64,
    pub estimated_cost_cents: Option<Cents>,
    pub scheduled_at: Option<Timestamp>,
    pub launched_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a campaign (wizard step 1 and anything already known).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCampaign {
    pub name: String,
    /// Kept as text so a missing or unknown channel is a validation error.
    pub channel: Option<String>,
    pub bot_id: Option<DbId>,
    pub template_id: Option<DbId>,
    pub body: Option<String>,
    #[serde(default)]
    pub variable_mapping: VariableMapping,
    pub scheduled_at: Option<Timestamp>,
}

/// DTO for updating a draft campaign. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCampaign {
    pub name: Option<String>,
    pub bot_id: Option<DbId>,
    pub template_id: Option<DbId>,
    pub body: Option<String>,
    pub variable_mapping: Option<VariableMapping>,
    pub scheduled_at: Option<Timestamp>,
    /// Clears `scheduled_at` (send immediately on launch).
    #[serde(default)]
    pub send_now: bool,
}

/// A row from the `campaign_recipients` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CampaignRecipient {
    pub id: DbId,
    pub campaign_id: DbId,
    pub contact_id: Option<DbId>,
    pub phone: String,
    pub rendered_body: String,
    pub status: String,
    pub error_message: Option<String>,
    pub status_updated_at: Timestamp,
    pub created_at: Timestamp,
}

/// A recipient to be inserted at launch.
#[derive(Debug, Clone)]
pub struct NewRecipient {
    pub contact_id: Option<DbId>,
    pub phone: String,
    pub rendered_body: String,
}

/// How a launch should change the campaign and wallet.
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    pub cost_cents: Cents,
    /// `Scheduled` or `Running`.
    pub status: CampaignStatus,
    pub recipients: Vec<NewRecipient>,
    pub launched_by: DbId,
}
