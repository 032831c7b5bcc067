use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use serde_json::json;
use tempfile::TempDir;
use wedding_invitation_api::storage::TenantRegistry;
use wedding_tenant_resolver::{CachedTenantLookup, TenantRecord, TenantResolver};

pub struct ResolverBenchFixture {
    pub registry: Arc<TenantRegistry>,
    pub resolver: TenantResolver<Arc<TenantRegistry>>,
    pub cached_resolver: TenantResolver<CachedTenantLookup<Arc<TenantRegistry>>>,
    pub active_slugs: Vec<String>,
    pub inactive_slugs: Vec<String>,
    pub temp_dir: TempDir,
}

impl ResolverBenchFixture {
    /// Seeds `active` live tenants and `inactive` archived ones.
    pub fn new(active: usize, inactive: usize) -> Self {
        let temp_dir = TempDir::new().expect("tempdir");
        let registry = Arc::new(TenantRegistry::new(temp_dir.path()).expect("tenant registry"));

        let active_slugs: Vec<String> = (0..active).map(|_| random_slug("couple")).collect();
        let inactive_slugs: Vec<String> = (0..inactive).map(|_| random_slug("archived")).collect();

        for slug in &active_slugs {
            seed_tenant(&registry, slug, true);
        }
        for slug in &inactive_slugs {
            seed_tenant(&registry, slug, false);
        }

        let cache = CachedTenantLookup::new(Arc::clone(&registry), Duration::from_secs(300));

        Self {
            resolver: TenantResolver::new(Arc::clone(&registry)),
            cached_resolver: TenantResolver::new(cache),
            registry,
            active_slugs,
            inactive_slugs,
            temp_dir,
        }
    }
}

pub fn seed_tenant(registry: &TenantRegistry, slug: &str, is_active: bool) {
    let now = Utc::now().to_rfc3339();
    registry
        .create_tenant(&TenantRecord {
            slug: slug.to_string(),
            name: format!("Wedding of {slug}"),
            is_active,
            config: Some(json!({
                "weddingDate": "2030-06-15T15:00:00Z",
                "venue": "Riverside Garden"
            })),
            created_at: now.clone(),
            updated_at: now,
        })
        .expect("seed tenant");
}

/// A well-formed slug with a random suffix, e.g. `couple-x8Kq2LmA`.
pub fn random_slug(prefix: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("{prefix}-{suffix}")
}
