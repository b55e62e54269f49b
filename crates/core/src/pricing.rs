//! Campaign cost estimation.
//!
//! Cost is a flat per-message rate for the channel multiplied by the audience
//! size. All amounts are integer cents.

use serde::Serialize;

use crate::channels::{Channel, ChannelRates};
use crate::error::CoreError;
use crate::types::Cents;

/// Estimated cost of sending one message to every recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CostEstimate {
    pub channel: Channel,
    pub audience_count: i64,
    pub rate_cents: Cents,
    pub total_cents: Cents,
}

/// Multiply `audience_count` by `rate`, rejecting negatives and overflow.
pub fn estimate_cost(audience_count: i64, rate: Cents) -> Result<Cents, CoreError> {
    if audience_count < 0 {
        return Err(CoreError::Validation(format!(
            "Audience count must not be negative (got {audience_count})"
        )));
    }
    if rate < 0 {
        return Err(CoreError::Validation(format!(
            "Rate must not be negative (got {rate})"
        )));
    }
    audience_count.checked_mul(rate).ok_or_else(|| {
        CoreError::Validation("Estimated cost exceeds the supported range".to_string())
    })
}

/// Build a full estimate for `channel` using `rates`.
pub fn estimate_campaign(
    channel: Channel,
    audience_count: i64,
    rates: &ChannelRates,
) -> Result<CostEstimate, CoreError> {
    let rate_cents = rates.rate_for(channel);
    let total_cents = estimate_cost(audience_count, rate_cents)?;
    Ok(CostEstimate {
        channel,
        audience_count,
        rate_cents,
        total_cents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::DEFAULT_RATES;

    #[test]
    fn multiplies_audience_by_rate() {
        assert_eq!(estimate_cost(1_000, 25).unwrap(), 25_000);
        assert_eq!(estimate_cost(0, 25).unwrap(), 0);
    }

    #[test]
    fn negative_inputs_rejected() {
        assert!(estimate_cost(-1, 25).is_err());
        assert!(estimate_cost(10, -5).is_err());
    }

    #[test]
    fn overflow_rejected() {
        let err = estimate_cost(i64::MAX, 2).unwrap_err();
        assert!(err.to_string().contains("supported range"));
    }

    #[test]
    fn campaign_estimate_uses_channel_rate() {
        let estimate = estimate_campaign(Channel::Rcs, 3, &DEFAULT_RATES).unwrap();
        assert_eq!(estimate.rate_cents, DEFAULT_RATES.rcs);
        assert_eq!(estimate.total_cents, 3 * DEFAULT_RATES.rcs);
        assert_eq!(estimate.channel, Channel::Rcs);
    }
}
