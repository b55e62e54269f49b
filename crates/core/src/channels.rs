//! Messaging channels and their per-message rates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Cents;

/// A messaging channel a bot or campaign sends through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Sms,
    Rcs,
    Whatsapp,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Sms, Channel::Rcs, Channel::Whatsapp];

    /// The value stored in `TEXT` channel columns.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sms => "sms",
            Self::Rcs => "rcs",
            Self::Whatsapp => "whatsapp",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sms" => Ok(Self::Sms),
            "rcs" => Ok(Self::Rcs),
            "whatsapp" => Ok(Self::Whatsapp),
            other => Err(CoreError::Validation(format!(
                "Unknown channel '{other}'. Expected one of: sms, rcs, whatsapp"
            ))),
        }
    }
}

/// Flat per-message rates, in cents, for each channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRates {
    pub sms: Cents,
    pub rcs: Cents,
    pub whatsapp: Cents,
}

/// Platform rates applied to clients without a plan.
pub const DEFAULT_RATES: ChannelRates = ChannelRates {
    sms: 25,
    rcs: 40,
    whatsapp: 60,
};

impl ChannelRates {
    pub fn rate_for(&self, channel: Channel) -> Cents {
        match channel {
            Channel::Sms => self.sms,
            Channel::Rcs => self.rcs,
            Channel::Whatsapp => self.whatsapp,
        }
    }
}

impl Default for ChannelRates {
    fn default() -> Self {
        DEFAULT_RATES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("SMS".parse::<Channel>().unwrap(), Channel::Sms);
        assert_eq!(" rcs ".parse::<Channel>().unwrap(), Channel::Rcs);
        assert_eq!("WhatsApp".parse::<Channel>().unwrap(), Channel::Whatsapp);
    }

    #[test]
    fn unknown_channel_rejected() {
        let err = "fax".parse::<Channel>().unwrap_err();
        assert!(err.to_string().contains("Unknown channel 'fax'"));
    }

    #[test]
    fn as_str_round_trips_through_from_str() {
        for channel in Channel::ALL {
            assert_eq!(channel.as_str().parse::<Channel>().unwrap(), channel);
        }
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Channel::Whatsapp).unwrap();
        assert_eq!(json, "\"whatsapp\"");
        let parsed: Channel = serde_json::from_str("\"rcs\"").unwrap();
        assert_eq!(parsed, Channel::Rcs);
    }

    #[test]
    fn rate_for_picks_channel_rate() {
        let rates = ChannelRates {
            sms: 10,
            rcs: 20,
            whatsapp: 30,
        };
        assert_eq!(rates.rate_for(Channel::Sms), 10);
        assert_eq!(rates.rate_for(Channel::Rcs), 20);
        assert_eq!(rates.rate_for(Channel::Whatsapp), 30);
    }
}
