//! Pricing plan model and DTOs.

use msgdesk_core::channels::ChannelRates;
use msgdesk_core::types::{Cents, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A plan row from the `plans` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Plan {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub monthly_fee_cents: Cents,
    pub sms_rate_cents: Cents,
    pub rcs_rate_cents: Cents,
    pub whatsapp_rate_cents: Cents,
    /// `None` means unlimited.
    pub monthly_message_quota: Option<i64>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Plan {
    pub fn rates(&self) -> ChannelRates {
        ChannelRates {
            sms: self.sms_rate_cents,
            rcs: self.rcs_rate_cents,
            whatsapp: self.whatsapp_rate_cents,
        }
    }
}

/// DTO for creating a plan.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlan {
    pub name: String,
    pub description: Option<String>,
    pub monthly_fee_cents: Option<Cents>,
    pub sms_rate_cents: Cents,
    pub rcs_rate_cents: Cents,
    pub whatsapp_rate_cents: Cents,
    pub monthly_message_quota: Option<i64>,
}

/// DTO for updating a plan. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePlan {
    pub name: Option<String>,
    pub description: Option<String>,
    pub monthly_fee_cents: Option<Cents>,
    pub sms_rate_cents: Option<Cents>,
    pub rcs_rate_cents: Option<Cents>,
    pub whatsapp_rate_cents: Option<Cents>,
    pub monthly_message_quota: Option<i64>,
    pub is_active: Option<bool>,
}
