use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::slug::TenantSlug;

/// Infrastructure failure reported by a lookup collaborator.
pub type LookupError = anyhow::Error;

/// Read-only view of a tenant as stored by the tenant registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantRecord {
    pub slug: String,
    pub name: String,
    pub is_active: bool,
    #[serde(default)]
    pub config: Option<Value>,
    pub created_at: String,
    pub updated_at: String,
}

/// Storage collaborator used for existence and activity checks.
///
/// Implementations match the slug exactly (case-sensitive) and return
/// `Ok(None)` for unknown tenants. `Err` is reserved for genuine
/// infrastructure failures.
#[async_trait]
pub trait TenantLookup: Send + Sync {
    async fn find_tenant_by_slug(&self, slug: &TenantSlug)
        -> Result<Option<TenantRecord>, LookupError>;
}

#[async_trait]
impl<T> TenantLookup for std::sync::Arc<T>
where
    T: TenantLookup + ?Sized,
{
    async fn find_tenant_by_slug(
        &self,
        slug: &TenantSlug,
    ) -> Result<Option<TenantRecord>, LookupError> {
        (**self).find_tenant_by_slug(slug).await
    }
}
