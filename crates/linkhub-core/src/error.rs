use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Validation messages keyed by form field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// `Ok(())` when nothing was recorded, otherwise a validation error.
    pub fn into_result(self) -> Result<(), HubError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(HubError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Failures surfaced by the action layer.
///
/// `Storage` keeps the underlying I/O error as its source for logging, but its
/// `Display` never includes it.
#[derive(Error, Debug)]
pub enum HubError {
    #[error("Invalid fields.")]
    Validation(FieldErrors),

    #[error("Unauthorized.")]
    Unauthorized,

    #[error("Invalid username or password.")]
    InvalidCredentials,

    #[error("Failed to find link for deletion or link already deleted.")]
    NotFound(String),

    #[error("{context}")]
    Storage {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl HubError {
    pub fn storage(context: &'static str, source: std::io::Error) -> Self {
        HubError::Storage { context, source }
    }

    /// Field-level detail for validation failures.
    pub fn details(&self) -> Option<&FieldErrors> {
        match self {
            HubError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

pub type HubResult<T> = std::result::Result<T, HubError>;
