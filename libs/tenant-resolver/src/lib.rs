//! Tenant slug resolution for the wedding invitation platform.
//!
//! Every guest-facing request carries a tenant slug, either as the first path
//! segment (`/acme-wedding/rsvp`) or as an explicit `tenant` parameter. This
//! crate turns that raw input into a [`TenantSlug`] that is known to be well
//! formed and, when a [`TenantLookup`] is supplied, known to belong to an
//! active tenant.
//!
//! Format checks are plain functions and never touch storage. Existence checks
//! are async and only accept an already validated [`TenantSlug`], so garbage
//! input can never reach the lookup collaborator.

pub mod cache;
pub mod error;
pub mod lookup;
pub mod resolver;
pub mod slug;

pub use cache::CachedTenantLookup;
pub use error::{ErrorKind, SlugValidationResult, TenantValidationError, ValidationReport};
pub use lookup::{LookupError, TenantLookup, TenantRecord};
pub use resolver::TenantResolver;
pub use slug::{
    extract_slug_from_path, validate_slug_format, TenantSlug, MAX_SLUG_LENGTH, MIN_SLUG_LENGTH,
};
