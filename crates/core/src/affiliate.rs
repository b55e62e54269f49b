//! Affiliate referral codes and commission arithmetic.
//!
//! Commission rates are stored in basis points (1/100 of a percent) so that
//! payouts stay in exact integer cents.

use rand::Rng;

use crate::error::CoreError;
use crate::types::Cents;

/// 100% expressed in basis points.
pub const MAX_COMMISSION_BPS: i32 = 10_000;

/// Length of generated referral codes.
pub const REFERRAL_CODE_LENGTH: usize = 8;
const MIN_REFERRAL_CODE_LENGTH: usize = 4;
const MAX_REFERRAL_CODE_LENGTH: usize = 16;

const REFERRAL_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Validate a commission rate in basis points.
pub fn validate_commission_bps(bps: i32) -> Result<(), CoreError> {
    if !(0..=MAX_COMMISSION_BPS).contains(&bps) {
        return Err(CoreError::Validation(format!(
            "Commission rate must be between 0 and {MAX_COMMISSION_BPS} basis points (got {bps})"
        )));
    }
    Ok(())
}

/// Commission owed on `amount` at `bps`, rounded down to the cent.
pub fn commission_cents(amount: Cents, bps: i32) -> Cents {
    let owed = i128::from(amount) * i128::from(bps) / i128::from(MAX_COMMISSION_BPS);
    Cents::try_from(owed).unwrap_or(Cents::MAX)
}

/// Validate a referral code: 4 to 16 uppercase letters or digits.
pub fn validate_referral_code(code: &str) -> Result<(), CoreError> {
    let valid_len = (MIN_REFERRAL_CODE_LENGTH..=MAX_REFERRAL_CODE_LENGTH).contains(&code.len());
    let valid_chars = code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
    if !valid_len || !valid_chars {
        return Err(CoreError::Validation(format!(
            "Referral code '{code}' must be {MIN_REFERRAL_CODE_LENGTH}-{MAX_REFERRAL_CODE_LENGTH} uppercase letters or digits"
        )));
    }
    Ok(())
}

/// Generate a random referral code. Ambiguous characters (`0`, `O`, `1`, `I`)
/// are never used.
pub fn generate_referral_code() -> String {
    let mut rng = rand::rng();
    (0..REFERRAL_CODE_LENGTH)
        .map(|_| REFERRAL_ALPHABET[rng.random_range(0..REFERRAL_ALPHABET.len())] as char)
        .collect()
}
