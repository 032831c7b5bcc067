use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::slug::TenantSlug;

/// Outcome of any slug validation step.
pub type SlugValidationResult = Result<TenantSlug, TenantValidationError>;

/// Coarse category of a validation failure.
///
/// `Format` and `NotFoundOrInactive` are caller mistakes (400 class),
/// `LookupInfrastructure` means the validation machinery itself is broken
/// (500 class).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Format,
    NotFoundOrInactive,
    LookupInfrastructure,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TenantValidationError {
    #[error("No tenant slug provided")]
    MissingSlug,
    #[error(
        "Invalid tenant slug format. Only letters, numbers, hyphens, and underscores are allowed."
    )]
    InvalidCharacters,
    #[error("Tenant slug must be between 2 and 50 characters long.")]
    InvalidLength,
    /// Deliberately covers both "no such tenant" and "tenant disabled".
    #[error("Tenant not found or inactive.")]
    NotFoundOrInactive,
    #[error("Failed to validate tenant")]
    LookupFailed { details: String },
}

impl TenantValidationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingSlug | Self::InvalidCharacters | Self::InvalidLength => ErrorKind::Format,
            Self::NotFoundOrInactive => ErrorKind::NotFoundOrInactive,
            Self::LookupFailed { .. } => ErrorKind::LookupInfrastructure,
        }
    }

    /// Underlying collaborator message, only present for lookup failures.
    pub fn details(&self) -> Option<&str> {
        match self {
            Self::LookupFailed { details } => Some(details.as_str()),
            _ => None,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.kind() != ErrorKind::LookupInfrastructure
    }
}

/// Wire form of a [`SlugValidationResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<&SlugValidationResult> for ValidationReport {
    fn from(result: &SlugValidationResult) -> Self {
        match result {
            Ok(slug) => Self {
                is_valid: true,
                slug: Some(slug.to_string()),
                error: None,
                details: None,
            },
            Err(err) => Self {
                is_valid: false,
                slug: None,
                error: Some(err.to_string()),
                details: err.details().map(str::to_string),
            },
        }
    }
}
