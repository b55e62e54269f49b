//! RCS template rules: template kinds, approval workflow, and suggestion
//! buttons.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::template::{extract_variables, validate_body};
use crate::channels::Channel;
use crate::validation::{validate_phone, validate_url};

/// Maximum suggestion buttons on one template.
pub const MAX_BUTTONS: usize = 4;
/// Maximum characters in a button label.
pub const MAX_BUTTON_LABEL_LENGTH: usize = 25;
/// Maximum characters in a rich card title.
pub const MAX_CARD_TITLE_LENGTH: usize = 200;

macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident, $what:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(CoreError::Validation(format!(
                        concat!("Unknown ", $what, " '{}'"),
                        other
                    ))),
                }
            }
        }
    };
}

text_enum!(
    /// Layout of an RCS template.
    TemplateType, "template type" {
        Text => "text",
        RichCard => "rich_card",
        Carousel => "carousel",
    }
);

text_enum!(
    /// Approval state of an RCS template.
    TemplateStatus, "template status" {
        Draft => "draft",
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
);

text_enum!(
    /// Action performed by a suggestion button.
    ButtonType, "button type" {
        Url => "url",
        Dial => "dial",
        Reply => "reply",
    }
);

impl TemplateStatus {
    /// Drafts and rejected templates can be (re)submitted for review.
    pub fn can_submit(self) -> bool {
        matches!(self, Self::Draft | Self::Rejected)
    }

    /// Only pending templates can be approved or rejected.
    pub fn can_review(self) -> bool {
        self == Self::Pending
    }

    /// Approved templates are the only ones usable in campaigns.
    pub fn is_usable(self) -> bool {
        self == Self::Approved
    }
}

/// Outcome chosen by a reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    pub fn resulting_status(self) -> TemplateStatus {
        match self {
            Self::Approve => TemplateStatus::Approved,
            Self::Reject => TemplateStatus::Rejected,
        }
    }
}

/// A suggestion button as submitted by the console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonSpec {
    pub button_type: ButtonType,
    pub label: String,
    /// URL for `url`, phone number for `dial`, postback text for `reply`.
    pub value: String,
}

/// Validate a template's buttons.
pub fn validate_buttons(buttons: &[ButtonSpec]) -> Result<(), CoreError> {
    if buttons.len() > MAX_BUTTONS {
        return Err(CoreError::Validation(format!(
            "A template may have at most {MAX_BUTTONS} buttons (got {})",
            buttons.len()
        )));
    }
    for (i, button) in buttons.iter().enumerate() {
        let n = i + 1;
        let label_len = button.label.trim().chars().count();
        if label_len == 0 || label_len > MAX_BUTTON_LABEL_LENGTH {
            return Err(CoreError::Validation(format!(
                "Button {n} label must be 1-{MAX_BUTTON_LABEL_LENGTH} characters"
            )));
        }
        match button.button_type {
            ButtonType::Url => validate_url(&format!("Button {n} URL"), &button.value)?,
            ButtonType::Dial => {
                validate_phone(&button.value)?;
            }
            ButtonType::Reply => {
                if button.value.trim().is_empty() {
                    return Err(CoreError::Validation(format!(
                        "Button {n} reply text must not be empty"
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Validate a template's layout-specific fields and body.
pub fn validate_template(
    template_type: TemplateType,
    body: &str,
    card_title: Option<&str>,
    media_url: Option<&str>,
) -> Result<(), CoreError> {
    validate_body(Channel::Rcs, body)?;
    if let Some(url) = media_url {
        validate_url("Media URL", url)?;
    }
    match template_type {
        TemplateType::Text => Ok(()),
        TemplateType::RichCard | TemplateType::Carousel => {
            let title = card_title.map(str::trim).unwrap_or("");
            if title.is_empty() || title.chars().count() > MAX_CARD_TITLE_LENGTH {
                return Err(CoreError::Validation(format!(
                    "Card title must be 1-{MAX_CARD_TITLE_LENGTH} characters for {template_type} templates"
                )));
            }
            if media_url.is_none() {
                return Err(CoreError::Validation(format!(
                    "A media URL is required for {template_type} templates"
                )));
            }
            Ok(())
        }
    }
}

/// Variables declared by a template body, with their 0-based position.
pub fn declared_variables(body: &str) -> Vec<(usize, String)> {
    extract_variables(body).into_iter().enumerate().collect()
}
