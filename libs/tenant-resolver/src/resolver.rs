use tracing::{debug, error, info};

use crate::error::{SlugValidationResult, TenantValidationError};
use crate::lookup::TenantLookup;
use crate::slug::{extract_slug_from_path, validate_slug_format, TenantSlug};

/// Confirms that request input names an active tenant.
///
/// The resolver holds no state besides its collaborator; concurrent calls
/// never coordinate and nothing is cached here. Wrap the lookup in
/// [`crate::CachedTenantLookup`] when fewer storage round trips are needed.
#[derive(Debug, Clone)]
pub struct TenantResolver<L> {
    lookup: L,
}

impl<L: TenantLookup> TenantResolver<L> {
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }

    /// Checks that a well-formed slug belongs to an active tenant.
    ///
    /// Unknown and inactive tenants produce the same error so callers cannot
    /// tell which slugs exist. Collaborator failures are folded into
    /// [`TenantValidationError::LookupFailed`] rather than propagated.
    pub async fn validate_tenant_exists(&self, slug: &TenantSlug) -> SlugValidationResult {
        match self.lookup.find_tenant_by_slug(slug).await {
            Ok(Some(record)) if record.is_active => Ok(slug.clone()),
            Ok(Some(_)) => {
                info!(tenant = %slug, "tenant is inactive");
                Err(TenantValidationError::NotFoundOrInactive)
            }
            Ok(None) => {
                info!(tenant = %slug, "tenant not found");
                Err(TenantValidationError::NotFoundOrInactive)
            }
            Err(err) => {
                error!(tenant = %slug, error = ?err, "tenant lookup failed");
                Err(TenantValidationError::LookupFailed {
                    details: format!("{err:#}"),
                })
            }
        }
    }

    /// Format validation followed by the existence check.
    ///
    /// Malformed input returns before the collaborator is touched.
    pub async fn validate_tenant_id(&self, raw: Option<&str>) -> SlugValidationResult {
        let slug = validate_slug_format(raw).inspect_err(|err| {
            debug!(input = ?raw, reason = %err, "rejected tenant slug format");
        })?;

        self.validate_tenant_exists(&slug).await
    }

    /// Resolves the tenant addressed by the first segment of `pathname`.
    pub async fn resolve_path(&self, pathname: &str) -> SlugValidationResult {
        match extract_slug_from_path(pathname) {
            Some(candidate) => self.validate_tenant_id(Some(candidate)).await,
            None => {
                debug!(path = pathname, "no tenant slug in path");
                Err(TenantValidationError::MissingSlug)
            }
        }
    }
}
