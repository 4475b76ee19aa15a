//! Validation rules for attribute writes.
//!
//! A rule is a pure function from a raw value to either a coerced value or
//! a [`RuleViolation`]. Rules never mutate anything; the engine in
//! [`crate::record`] applies them and keeps the prior slot untouched on
//! rejection.
//!
//! Stock rules:
//! - [`numeric`]: accepts Float, Int, or numeric Text; yields Float
//! - [`non_negative_number`]: `numeric`, then rejects values below zero
//! - [`finite_number`]: `numeric`, then rejects NaN and infinities
//! - [`non_empty_text`]: accepts Text with at least one non-space character

use thiserror::Error;

use crate::value::AttrValue;

/// A pure validation/coercion rule.
///
/// On success, returns the value to store (which may differ from the
/// input, e.g. `Text("7.5")` coerced to `Float(7.5)`). On failure,
/// returns the violation; the caller still owns the rejected input.
pub type ValidationRule = fn(&AttrValue) -> Result<AttrValue, RuleViolation>;

/// Why a rule rejected a value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleViolation {
    #[error("must be a number, got \"{0}\"")]
    NotANumber(String),

    #[error("must not be negative, got {0}")]
    Negative(f64),

    #[error("must be finite, got {0}")]
    NotFinite(f64),

    #[error("must be text")]
    NotText,

    #[error("text must not be empty")]
    EmptyText,
}

/// Accept any numeric value, coercing numeric text to Float.
///
/// Mirrors the common "store whatever parses as a number" setter: Int
/// widens to Float, Text is parsed as f64, anything else is rejected
/// with the offending input.
pub fn numeric(value: &AttrValue) -> Result<AttrValue, RuleViolation> {
    match value {
        AttrValue::Float(v) => Ok(AttrValue::Float(*v)),
        AttrValue::Int(v) => Ok(AttrValue::Float(*v as f64)),
        AttrValue::Text(s) => match s.trim().parse::<f64>() {
            Ok(v) => Ok(AttrValue::Float(v)),
            Err(_) => Err(RuleViolation::NotANumber(s.clone())),
        },
        other => Err(RuleViolation::NotANumber(other.to_string())),
    }
}

/// `numeric`, then reject values below zero.
pub fn non_negative_number(value: &AttrValue) -> Result<AttrValue, RuleViolation> {
    let coerced = numeric(value)?;
    match coerced.as_float() {
        Some(v) if v < 0.0 => Err(RuleViolation::Negative(v)),
        _ => Ok(coerced),
    }
}

/// `numeric`, then reject NaN and infinities.
pub fn finite_number(value: &AttrValue) -> Result<AttrValue, RuleViolation> {
    let coerced = numeric(value)?;
    match coerced.as_float() {
        Some(v) if !v.is_finite() => Err(RuleViolation::NotFinite(v)),
        _ => Ok(coerced),
    }
}

/// Accept Text with at least one non-space character.
pub fn non_empty_text(value: &AttrValue) -> Result<AttrValue, RuleViolation> {
    match value {
        AttrValue::Text(s) if s.trim().is_empty() => Err(RuleViolation::EmptyText),
        AttrValue::Text(s) => Ok(AttrValue::Text(s.clone())),
        _ => Err(RuleViolation::NotText),
    }
}
