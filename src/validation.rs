//! Collects field-level validation failures so that a request can report every
//! invalid field at once.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::Error;

/// A single value failed validation.
///
/// The message is written for the client, e.g. "name must be between 1 and 50 characters".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct InvalidValue(pub String);

impl InvalidValue {
    /// Create an error from a client facing message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A field in a request and the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// The name of the field as it appears in the request JSON, e.g. "categoryId".
    pub field: String,
    /// Why the field was rejected.
    pub message: String,
}

/// The fields of a request that failed validation, in the order they were checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// Create an empty set of errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `field` is invalid.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.to_owned(),
            message: message.into(),
        });
    }

    /// Unwrap the result of validating `field`, recording the error if there was one.
    pub fn check<T>(&mut self, field: &str, result: Result<T, InvalidValue>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(InvalidValue(message)) => {
                self.add(field, message);
                None
            }
        }
    }

    /// Whether any field has been rejected.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `field` has been rejected.
    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|error| error.field == field)
    }

    /// The rejected fields.
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Fail with [Error::Validation] if any field has been rejected.
    pub fn into_result(self) -> Result<(), Error> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }

    /// Shortcut for a validation error with a single field.
    pub fn single(field: &str, message: impl Into<String>) -> Error {
        let mut errors = Self::new();
        errors.add(field, message);

        Error::Validation(errors)
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid fields:")?;

        for error in &self.0 {
            write!(f, " {} ({})", error.field, error.message)?;
        }

        Ok(())
    }
}

/// Trim `value` and check that its length in characters lies within `min..=max`.
///
/// `field` is only used to build the error message.
pub fn trimmed_with_length(
    field: &str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<String, InvalidValue> {
    let trimmed = value.trim();
    let length = trimmed.chars().count();

    if length < min || length > max {
        return Err(InvalidValue(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }

    Ok(trimmed.to_owned())
}

/// Error for a field that must be present in the request.
pub fn required(field: &str) -> InvalidValue {
    InvalidValue(format!("{field} is required"))
}
