//! Pure conversion arithmetic and display formatting

use serde::Serialize;

/// Result of converting an amount at a given rate.
///
/// `converted_amount` keeps full f64 precision; the display fields carry
/// the rounded figures shown to the user (2 decimals for the amount,
/// 4 for the per-unit rate).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversion {
    pub converted_amount: f64,
    pub display_amount: String,
    pub display_rate: String,
}

/// Convert `amount` at `rate`.
///
/// Assumes a sanitized non-negative amount (see [`parse_amount`]). Pure and
/// infallible: this is a multiplication, so no division-by-zero path exists.
pub fn convert(amount: f64, rate: f64) -> Conversion {
    let converted_amount = amount * rate;
    Conversion {
        converted_amount,
        display_amount: format!("{:.2}", converted_amount),
        display_rate: format!("{:.4}", rate),
    }
}

/// Parse a free-text amount field.
///
/// Anything that is not a non-negative finite number collapses to 0.0,
/// matching the amount field's free-text fallback.
pub fn parse_amount(input: &str) -> f64 {
    match input.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value,
        _ => 0.0,
    }
}
