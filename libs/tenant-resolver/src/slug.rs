use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::error::{SlugValidationResult, TenantValidationError};

pub const MIN_SLUG_LENGTH: usize = 2;
pub const MAX_SLUG_LENGTH: usize = 50;

static SLUG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("slug pattern compiles"));

/// A tenant slug that has passed format validation.
///
/// The only way to build one is [`validate_slug_format`] (or `TryFrom`), so
/// holding a `TenantSlug` means the cheap checks already ran. Case is
/// preserved: `Acme` and `acme` are different tenants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TenantSlug(String);

impl TenantSlug {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TenantSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TenantSlug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for TenantSlug {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl TryFrom<&str> for TenantSlug {
    type Error = TenantValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        validate_slug_format(Some(value))
    }
}

/// Checks the shape of a candidate slug without any I/O.
///
/// Checks run in a fixed order and the first failure wins: presence, then
/// character class, then length.
pub fn validate_slug_format(slug: Option<&str>) -> SlugValidationResult {
    let slug = match slug {
        Some(value) if !value.is_empty() => value,
        _ => return Err(TenantValidationError::MissingSlug),
    };

    if !SLUG_PATTERN.is_match(slug) {
        return Err(TenantValidationError::InvalidCharacters);
    }

    // The pattern admits ASCII only, so byte length equals char count here.
    if !(MIN_SLUG_LENGTH..=MAX_SLUG_LENGTH).contains(&slug.len()) {
        return Err(TenantValidationError::InvalidLength);
    }

    Ok(TenantSlug(slug.to_string()))
}

/// Returns the first path segment when it is a well-formed slug.
///
/// `/acme/rsvp` yields `acme`; the root path, an empty path and a malformed
/// first segment yield `None`. Later segments are never considered.
pub fn extract_slug_from_path(pathname: &str) -> Option<&str> {
    if pathname.is_empty() || pathname == "/" {
        return None;
    }

    let trimmed = pathname.strip_prefix('/').unwrap_or(pathname);
    let first = trimmed.split('/').next()?;

    if first.is_empty() || validate_slug_format(Some(first)).is_err() {
        return None;
    }

    Some(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_boundary_lengths() {
        let two = "ab";
        let fifty = "a".repeat(MAX_SLUG_LENGTH);

        assert_eq!(validate_slug_format(Some(two)).unwrap().as_str(), two);
        assert_eq!(validate_slug_format(Some(&fifty)).unwrap().as_str(), fifty);
    }

    #[test]
    fn rejects_out_of_range_lengths() {
        let too_long = "a".repeat(MAX_SLUG_LENGTH + 1);

        assert_eq!(
            validate_slug_format(Some("a")),
            Err(TenantValidationError::InvalidLength)
        );
        assert_eq!(
            validate_slug_format(Some(&too_long)),
            Err(TenantValidationError::InvalidLength)
        );
    }

    #[test]
    fn character_check_precedes_length_check() {
        assert_eq!(
            validate_slug_format(Some("!")),
            Err(TenantValidationError::InvalidCharacters)
        );
        let long_and_bad = format!("{} x", "a".repeat(60));
        assert_eq!(
            validate_slug_format(Some(&long_and_bad)),
            Err(TenantValidationError::InvalidCharacters)
        );
    }

    #[test]
    fn preserves_case() {
        let upper = validate_slug_format(Some("Acme")).unwrap();
        let lower = validate_slug_format(Some("acme")).unwrap();
        assert_eq!(upper.as_str(), "Acme");
        assert_ne!(upper, lower);
    }

    #[test]
    fn path_without_leading_slash_still_uses_first_segment() {
        assert_eq!(extract_slug_from_path("acme/rsvp"), Some("acme"));
    }

    #[test]
    fn double_slash_yields_nothing() {
        assert_eq!(extract_slug_from_path("//acme"), None);
    }

    #[test]
    fn try_from_runs_format_validation() {
        assert!(TenantSlug::try_from("wedding_2025").is_ok());
        assert_eq!(
            TenantSlug::try_from("wedding 2025"),
            Err(TenantValidationError::InvalidCharacters)
        );
    }
}
