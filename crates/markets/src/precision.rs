//! Decimal-digit precision from tick and lot sizes.
//!
//! Exchanges publish increments either as strings (`"0.00100000"`) or as JSON
//! numbers (`0.5`). The precision of an increment is the number of digits
//! after the dot needed to write it, which is `-log10(step)` whenever the
//! step is a power of ten. Steps above one give negative precision
//! (`100` -> `-2`).

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::errors::MarketsError;

/// Precision of a step size given as a string.
///
/// Trailing zeros are ignored, so `"0.00100000"` and `"0.001"` both give 3.
pub fn calc_precision(step: &str) -> Result<i32, MarketsError> {
    let decimal = parse_decimal(step)?;
    digits(decimal).ok_or_else(|| MarketsError::InvalidNumber(step.to_string()))
}

/// Precision of a step size given as a JSON number.
pub fn calc_precision_f64(step: f64) -> Result<i32, MarketsError> {
    if !step.is_finite() || step <= 0.0 {
        return Err(MarketsError::InvalidNumber(step.to_string()));
    }
    // f64 Display prints the shortest round-trip form without an exponent.
    calc_precision(&step.to_string())
}

/// Parse an exchange-provided decimal string exactly.
pub(crate) fn parse_decimal(value: &str) -> Result<Decimal, MarketsError> {
    let trimmed = value.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| MarketsError::InvalidNumber(value.to_string()))
}

/// Parse an exchange-provided quantity string (`"0.00100000"`, `"10"`).
pub(crate) fn parse_f64(value: &str) -> Result<f64, MarketsError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| MarketsError::InvalidNumber(value.to_string()))
}

fn digits(step: Decimal) -> Option<i32> {
    if step <= Decimal::ZERO {
        return None;
    }
    let normalized = step.normalize();
    if normalized.scale() > 0 {
        return i32::try_from(normalized.scale()).ok();
    }

    let mut mantissa = normalized.mantissa();
    let mut zeros = 0;
    while mantissa % 10 == 0 {
        mantissa /= 10;
        zeros += 1;
    }
    Some(-zeros)
}
