use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use wedding_tenant_resolver::{CachedTenantLookup, TenantLookup, TenantResolver};

pub mod handlers;
pub mod router;
pub mod types;

pub use router::create_router;
pub use types::*;

use crate::config::InvitationApiConfig;
use crate::music::MusicLibrary;
use crate::storage::{
    GalleryStore, GuestStore, PreferenceStore, SqlitePreferenceStore, TenantRegistry,
};

pub struct ApiState {
    pub tenant_registry: Arc<TenantRegistry>,
    pub tenant_cache: Option<Arc<CachedTenantLookup<Arc<TenantRegistry>>>>,
    pub resolver: TenantResolver<Arc<dyn TenantLookup>>,
    pub guests: Arc<GuestStore>,
    pub gallery: Arc<GalleryStore>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub music: MusicLibrary,
    pub config: Arc<InvitationApiConfig>,
}

impl ApiState {
    pub fn new(config: InvitationApiConfig) -> Result<Self> {
        let data_dir = config.data_dir.clone();
        let tenant_registry =
            Arc::new(TenantRegistry::new(&data_dir).context("failed to open tenant registry")?);
        let guests = Arc::new(GuestStore::new(&data_dir).context("failed to open guest store")?);
        let gallery =
            Arc::new(GalleryStore::new(&data_dir).context("failed to open gallery store")?);
        let preferences: Arc<dyn PreferenceStore> = Arc::new(
            SqlitePreferenceStore::new(&data_dir).context("failed to open preference store")?,
        );

        Ok(Self::from_parts(
            config,
            tenant_registry,
            guests,
            gallery,
            preferences,
        ))
    }

    /// Wires the resolver on top of the registry, adding the lookup cache
    /// when a TTL is configured.
    pub fn from_parts(
        config: InvitationApiConfig,
        tenant_registry: Arc<TenantRegistry>,
        guests: Arc<GuestStore>,
        gallery: Arc<GalleryStore>,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Self {
        let Some(ttl) = config.tenant_cache_ttl() else {
            let lookup = Arc::clone(&tenant_registry) as Arc<dyn TenantLookup>;
            return Self::with_lookup(
                config,
                tenant_registry,
                lookup,
                guests,
                gallery,
                preferences,
            );
        };

        info!(ttl_secs = ttl.as_secs(), "tenant lookup cache enabled");
        let cache = Arc::new(CachedTenantLookup::new(Arc::clone(&tenant_registry), ttl));
        let lookup = Arc::clone(&cache) as Arc<dyn TenantLookup>;

        let mut state =
            Self::with_lookup(config, tenant_registry, lookup, guests, gallery, preferences);
        state.tenant_cache = Some(cache);
        state
    }

    /// Resolves tenants through `lookup` instead of the registry.
    ///
    /// Admin endpoints still write to `tenant_registry`; no cache is attached.
    pub fn with_lookup(
        config: InvitationApiConfig,
        tenant_registry: Arc<TenantRegistry>,
        lookup: Arc<dyn TenantLookup>,
        guests: Arc<GuestStore>,
        gallery: Arc<GalleryStore>,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Self {
        Self {
            tenant_registry,
            tenant_cache: None,
            resolver: TenantResolver::new(lookup),
            guests,
            gallery,
            preferences,
            music: MusicLibrary::new(config.music_dir.clone()),
            config: Arc::new(config),
        }
    }

    /// Drops any cached lookup for `slug` after an admin change.
    pub fn invalidate_tenant(&self, slug: &str) {
        if let Some(cache) = &self.tenant_cache {
            cache.invalidate(slug);
        }
    }
}
