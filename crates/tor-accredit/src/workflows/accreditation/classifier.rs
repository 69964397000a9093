//! Automatic remark assignment for extracted subject entries.

use super::domain::Remark;

/// Upper bound of the creditable unit band for a single subject. Institutional
/// policy: a subject carrying more than this many units cannot have come from
/// a single credit-bearing course and is treated as an extraction error.
pub const MAX_CREDITABLE_UNITS: f64 = 15.0;

/// Deterministic pass/fail rule over the unit count. Zero, negative,
/// above-band, and non-finite values all fail.
pub fn classify(units: f64) -> Remark {
    if units.is_finite() && units > 0.0 && units <= MAX_CREDITABLE_UNITS {
        Remark::Passed
    } else {
        Remark::FailedInvalidUnits
    }
}

/// Classifies the unit field exactly as extracted by OCR. Text that does not
/// parse as a number is an invalid unit count, not an error.
pub fn classify_raw(units: &str) -> Remark {
    match units.trim().parse::<f64>() {
        Ok(value) => classify(value),
        Err(_) => Remark::FailedInvalidUnits,
    }
}
