//! Money helpers using rust_decimal for precision
//!
//! All price/amount fields are `Decimal` in memory and decimal text in
//! storage. Binary floating point never touches the contribution ledger.

use rust_decimal::prelude::*;

use crate::utils::AppError;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed amount per field ($1,000,000)
const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Minimum allowed contribution ($0.01)
pub const MIN_CONTRIBUTION: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Round to 2 decimal places, half away from zero.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Render an amount for storage ("30.00", always 2 fraction digits).
pub fn to_stored(value: Decimal) -> String {
    format!("{:.2}", round2(value))
}

/// Parse an amount coming back from storage.
pub fn from_stored(text: &str) -> Result<Decimal, rust_decimal::Error> {
    Decimal::from_str(text)
}

/// Validate a non-negative amount within bounds.
pub fn validate_amount(value: Decimal, field: &str) -> Result<(), AppError> {
    if value.is_sign_negative() {
        return Err(AppError::validation(format!(
            "{field} must be non-negative, got {value}"
        )));
    }
    if value > MAX_AMOUNT {
        return Err(AppError::validation(format!(
            "{field} exceeds maximum allowed ({MAX_AMOUNT}), got {value}"
        )));
    }
    Ok(())
}
