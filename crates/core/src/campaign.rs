//! Campaign lifecycle and creation-wizard step gating.
//!
//! The console builds a campaign in five steps. Each step's requirements are
//! checked here so the API enforces the same gates the wizard shows.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::channels::Channel;
use crate::error::CoreError;
use crate::template::{unmapped_variables, validate_body, VariableMapping};
use crate::types::Timestamp;
use crate::validation::{validate_required_text, MAX_NAME_LENGTH};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a campaign, stored as TEXT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Scheduled,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl CampaignStatus {
    pub const ALL: [CampaignStatus; 6] = [
        Self::Draft,
        Self::Scheduled,
        Self::Running,
        Self::Completed,
        Self::Cancelled,
        Self::Failed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Scheduled => "scheduled",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }

    /// Whether the campaign's content and audience may still change.
    pub fn is_editable(self) -> bool {
        self == Self::Draft
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }

    /// Whether moving from `self` to `to` is a legal transition.
    pub fn can_transition(self, to: CampaignStatus) -> bool {
        use CampaignStatus::*;
        matches!(
            (self, to),
            (Draft, Scheduled | Running | Cancelled)
                | (Scheduled, Running | Cancelled)
                | (Running, Completed | Failed | Cancelled)
        )
    }

    /// Check a transition, producing a `Conflict` error when illegal.
    pub fn ensure_transition(self, to: CampaignStatus) -> Result<(), CoreError> {
        if self.can_transition(to) {
            Ok(())
        } else {
            Err(CoreError::Conflict(format!(
                "Campaign cannot move from {self} to {to}"
            )))
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CampaignStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown campaign status '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Recipient status
// ---------------------------------------------------------------------------

/// Delivery status of a single campaign recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientStatus {
    Queued,
    Sent,
    Delivered,
    Read,
    Failed,
}

impl RecipientStatus {
    pub const ALL: [RecipientStatus; 5] = [
        Self::Queued,
        Self::Sent,
        Self::Delivered,
        Self::Read,
        Self::Failed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Read => "read",
            Self::Failed => "failed",
        }
    }

    fn rank(self) -> u8 {
        match self {
            Self::Queued => 0,
            Self::Sent => 1,
            Self::Delivered => 2,
            Self::Read => 3,
            Self::Failed => 4,
        }
    }

    /// Delivery receipts only move forward; `failed` and `read` are final.
    pub fn can_advance_to(self, to: RecipientStatus) -> bool {
        match (self, to) {
            (Self::Failed | Self::Read, _) => false,
            (_, Self::Failed) => true,
            (from, to) => to.rank() > from.rank(),
        }
    }
}

impl fmt::Display for RecipientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecipientStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown recipient status '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Wizard
// ---------------------------------------------------------------------------

/// Steps of the campaign creation wizard, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Details = 1,
    Audience = 2,
    Message = 3,
    Schedule = 4,
    Review = 5,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        Self::Details,
        Self::Audience,
        Self::Message,
        Self::Schedule,
        Self::Review,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn next(self) -> Option<WizardStep> {
        Self::ALL.into_iter().find(|s| s.number() == self.number() + 1)
    }
}

/// The fields the wizard collects before a campaign can launch.
#[derive(Debug, Clone, Default)]
pub struct CampaignDraft {
    pub name: String,
    pub channel: Option<Channel>,
    pub audience_count: i64,
    pub body: Option<String>,
    pub variable_mapping: VariableMapping,
    pub scheduled_at: Option<Timestamp>,
}

/// Check the requirements of a single step (not the ones before it).
fn check_step(step: WizardStep, draft: &CampaignDraft, now: Timestamp) -> Result<(), CoreError> {
    match step {
        WizardStep::Details => {
            validate_required_text("Campaign name", &draft.name, MAX_NAME_LENGTH)?;
            if draft.channel.is_none() {
                return Err(CoreError::Validation(
                    "A channel must be selected".to_string(),
                ));
            }
            Ok(())
        }
        WizardStep::Audience => {
            if draft.audience_count <= 0 {
                return Err(CoreError::Validation(
                    "Select at least one recipient".to_string(),
                ));
            }
            Ok(())
        }
        WizardStep::Message => {
            let channel = draft.channel.ok_or_else(|| {
                CoreError::Validation("A channel must be selected".to_string())
            })?;
            let body = draft.body.as_deref().unwrap_or("");
            validate_body(channel, body)?;
            let missing = unmapped_variables(body, &draft.variable_mapping);
            if !missing.is_empty() {
                return Err(CoreError::Validation(format!(
                    "Variables without a mapping: {}",
                    missing.join(", ")
                )));
            }
            Ok(())
        }
        WizardStep::Schedule => match draft.scheduled_at {
            Some(at) if at <= now => Err(CoreError::Validation(
                "Scheduled time must be in the future".to_string(),
            )),
            _ => Ok(()),
        },
        WizardStep::Review => Ok(()),
    }
}

/// Validate `step` and every step before it.
pub fn validate_step(
    step: WizardStep,
    draft: &CampaignDraft,
    now: Timestamp,
) -> Result<(), CoreError> {
    WizardStep::ALL
        .into_iter()
        .take_while(|s| *s <= step)
        .try_for_each(|s| check_step(s, draft, now))
}

/// Validate the draft up to `from` and return the step that follows it.
pub fn can_advance(
    from: WizardStep,
    draft: &CampaignDraft,
    now: Timestamp,
) -> Result<WizardStep, CoreError> {
    validate_step(from, draft, now)?;
    from.next()
        .ok_or_else(|| CoreError::Validation("Review is the final step".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{ContactField, VariableSource};
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};

    fn complete_draft() -> CampaignDraft {
        let mut variable_mapping = VariableMapping::new();
        variable_mapping.insert("name".into(), VariableSource::Field(ContactField::Name));
        CampaignDraft {
            name: "Diwali offers".into(),
            channel: Some(Channel::Sms),
            audience_count: 10,
            body: Some("Hi {{name}}, 20% off today".into()),
            variable_mapping,
            scheduled_at: None,
        }
    }

    // -- wizard --

    #[test]
    fn empty_name_blocks_step_two() {
        let draft = CampaignDraft {
            name: "  ".into(),
            ..complete_draft()
        };
        assert_matches!(
            can_advance(WizardStep::Details, &draft, Utc::now()),
            Err(CoreError::Validation(msg)) if msg.contains("Campaign name")
        );
    }

    #[test]
    fn missing_channel_blocks_step_two() {
        let draft = CampaignDraft {
            channel: None,
            ..complete_draft()
        };
        assert_matches!(
            can_advance(WizardStep::Details, &draft, Utc::now()),
            Err(CoreError::Validation(msg)) if msg.contains("channel")
        );
    }

    #[test]
    fn details_step_advances_to_audience() {
        let draft = CampaignDraft {
            audience_count: 0,
            body: None,
            ..complete_draft()
        };
        assert_eq!(
            can_advance(WizardStep::Details, &draft, Utc::now()).unwrap(),
            WizardStep::Audience
        );
    }

    #[test]
    fn empty_audience_blocks_message_step() {
        let draft = CampaignDraft {
            audience_count: 0,
            ..complete_draft()
        };
        assert!(can_advance(WizardStep::Audience, &draft, Utc::now()).is_err());
    }

    #[test]
    fn unmapped_variable_blocks_schedule_step() {
        let draft = CampaignDraft {
            body: Some("Hi {{name}}, code {{code}}".into()),
            ..complete_draft()
        };
        assert_matches!(
            can_advance(WizardStep::Message, &draft, Utc::now()),
            Err(CoreError::Validation(msg)) if msg.contains("code")
        );
    }

    #[test]
    fn past_schedule_rejected() {
        let now = Utc::now();
        let draft = CampaignDraft {
            scheduled_at: Some(now - Duration::minutes(5)),
            ..complete_draft()
        };
        assert!(validate_step(WizardStep::Schedule, &draft, now).is_err());

        let draft = CampaignDraft {
            scheduled_at: Some(now + Duration::hours(1)),
            ..complete_draft()
        };
        assert!(validate_step(WizardStep::Schedule, &draft, now).is_ok());
    }

    #[test]
    fn review_revalidates_earlier_steps() {
        let draft = CampaignDraft {
            body: None,
            ..complete_draft()
        };
        assert!(validate_step(WizardStep::Review, &draft, Utc::now()).is_err());
        assert!(validate_step(WizardStep::Review, &complete_draft(), Utc::now()).is_ok());
    }

    #[test]
    fn review_is_final() {
        assert!(can_advance(WizardStep::Review, &complete_draft(), Utc::now()).is_err());
    }

    // -- status --

    #[test]
    fn legal_transitions() {
        use CampaignStatus::*;
        assert!(Draft.can_transition(Running));
        assert!(Draft.can_transition(Scheduled));
        assert!(Scheduled.can_transition(Running));
        assert!(Running.can_transition(Completed));
        assert!(Running.can_transition(Cancelled));
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for from in [CampaignStatus::Completed, CampaignStatus::Cancelled, CampaignStatus::Failed] {
            assert!(from.is_terminal());
            for to in CampaignStatus::ALL {
                assert!(!from.can_transition(to), "{from} -> {to} must be illegal");
            }
        }
    }

    #[test]
    fn draft_cannot_complete() {
        assert_matches!(
            CampaignStatus::Draft.ensure_transition(CampaignStatus::Completed),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn status_parses_from_storage_value() {
        assert_eq!("running".parse::<CampaignStatus>().unwrap(), CampaignStatus::Running);
        assert!("paused".parse::<CampaignStatus>().is_err());
    }

    #[test]
    fn recipient_status_moves_forward_only() {
        use RecipientStatus::*;
        assert!(Queued.can_advance_to(Sent));
        assert!(Sent.can_advance_to(Read));
        assert!(Delivered.can_advance_to(Failed));
        assert!(!Delivered.can_advance_to(Sent));
        assert!(!Read.can_advance_to(Failed));
        assert!(!Failed.can_advance_to(Delivered));
        assert!(!Sent.can_advance_to(Sent));
    }
}
