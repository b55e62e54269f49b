//! Prepaid wallet arithmetic.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Cents;

/// Largest single top-up accepted, in cents.
pub const MAX_TOP_UP_CENTS: Cents = 100_000_000;

/// Direction of a wallet transaction, stored as TEXT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Credit,
    Debit,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            other => Err(CoreError::Validation(format!(
                "Unknown transaction kind '{other}'"
            ))),
        }
    }
}

/// Validate a top-up amount.
pub fn validate_amount(amount: Cents) -> Result<(), CoreError> {
    if amount <= 0 {
        return Err(CoreError::Validation(format!(
            "Amount must be positive (got {amount})"
        )));
    }
    if amount > MAX_TOP_UP_CENTS {
        return Err(CoreError::Validation(format!(
            "Amount exceeds the maximum of {MAX_TOP_UP_CENTS} cents"
        )));
    }
    Ok(())
}

/// Apply a transaction to `balance` and return the new balance.
///
/// A debit larger than the balance fails with `InsufficientFunds`.
pub fn apply(balance: Cents, kind: TransactionKind, amount: Cents) -> Result<Cents, CoreError> {
    if amount < 0 {
        return Err(CoreError::Validation(format!(
            "Amount must not be negative (got {amount})"
        )));
    }
    match kind {
        TransactionKind::Credit => balance.checked_add(amount).ok_or_else(|| {
            CoreError::Validation("Balance exceeds the supported range".to_string())
        }),
        TransactionKind::Debit if amount > balance => Err(CoreError::InsufficientFunds {
            required: amount,
            available: balance,
        }),
        TransactionKind::Debit => Ok(balance - amount),
    }
}
