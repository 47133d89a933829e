//! Parsing of free-text form fields into numbers, with the short messages the
//! dashboard shows next to an invalid field.

use std::fmt::Display;
use std::str::FromStr;

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Required")]
    Required,
    #[error("Invalid number")]
    Invalid,
    #[error("Min: {0}")]
    Min(String),
    #[error("Max: {0}")]
    Max(String),
}

#[derive(Clone, Copy, Debug)]
pub struct Bounds<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T> Bounds<T> {
    pub const fn none() -> Self {
        Self { min: None, max: None }
    }

    pub const fn at_least(min: T) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }
}

fn check<T: PartialOrd + Display + Copy>(v: T, bounds: Bounds<T>) -> Result<T, FieldError> {
    if let Some(min) = bounds.min {
        if v < min {
            return Err(FieldError::Min(min.to_string()));
        }
    }
    if let Some(max) = bounds.max {
        if v > max {
            return Err(FieldError::Max(max.to_string()));
        }
    }
    Ok(v)
}

/// Empty input is `Ok(None)`; anything else must parse and sit in bounds.
pub fn optional<T>(text: &str, bounds: Bounds<T>) -> Result<Option<T>, FieldError>
where
    T: FromStr + PartialOrd + Display + Copy,
{
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    let v = text.parse::<T>().map_err(|_| FieldError::Invalid)?;
    check(v, bounds).map(Some)
}

pub fn required<T>(text: &str, bounds: Bounds<T>) -> Result<T, FieldError>
where
    T: FromStr + PartialOrd + Display + Copy,
{
    optional(text, bounds)?.ok_or(FieldError::Required)
}

/// Text for an optional value; `None` is the empty string.
pub fn show<T: Display>(v: Option<T>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}
