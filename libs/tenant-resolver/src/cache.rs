use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::{debug, warn};

use crate::lookup::{LookupError, TenantLookup, TenantRecord};
use crate::slug::TenantSlug;

/// Upper bound on cached slugs unless configured otherwise.
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Expired entries are swept after this many inserts.
const SWEEP_INTERVAL: usize = 256;

struct CacheEntry {
    record: Option<TenantRecord>,
    fetched_at: Instant,
}

/// Short-lived cache in front of another [`TenantLookup`].
///
/// Hits and misses are both cached for `ttl`; lookup errors are never
/// cached. Activity status can change underneath, so keep the TTL short.
///
/// Expired entries are dropped when read and swept periodically on insert.
/// The map never holds more than `max_entries` slugs; once full, new
/// answers are passed through uncached.
pub struct CachedTenantLookup<L> {
    inner: L,
    ttl: Duration,
    max_entries: usize,
    inserts: AtomicUsize,
    entries: DashMap<String, CacheEntry>,
}

impl<L: TenantLookup> CachedTenantLookup<L> {
    pub fn new(inner: L, ttl: Duration) -> Self {
        Self::with_capacity(inner, ttl, DEFAULT_MAX_ENTRIES)
    }

    pub fn with_capacity(inner: L, ttl: Duration, max_entries: usize) -> Self {
        Self {
            inner,
            ttl,
            max_entries,
            inserts: AtomicUsize::new(0),
            entries: DashMap::new(),
        }
    }

    pub fn invalidate(&self, slug: &str) {
        self.entries.remove(slug);
    }

    fn cached(&self, slug: &TenantSlug) -> Option<Option<TenantRecord>> {
        let hit = {
            let entry = self.entries.get(slug.as_str())?;
            (entry.fetched_at.elapsed() < self.ttl).then(|| entry.record.clone())
        };

        if hit.is_none() {
            self.entries
                .remove_if(slug.as_str(), |_, entry| entry.fetched_at.elapsed() >= self.ttl);
        }
        hit
    }

    fn sweep_expired(&self) {
        self.entries
            .retain(|_, entry| entry.fetched_at.elapsed() < self.ttl);
    }

    fn store(&self, slug: &TenantSlug, record: &Option<TenantRecord>) {
        let inserts = self.inserts.fetch_add(1, Ordering::Relaxed) + 1;
        if inserts % SWEEP_INTERVAL == 0 || self.entries.len() >= self.max_entries {
            self.sweep_expired();
        }

        if self.entries.len() >= self.max_entries && !self.entries.contains_key(slug.as_str()) {
            warn!(
                max_entries = self.max_entries,
                "tenant lookup cache full, skipping insert"
            );
            return;
        }

        self.entries.insert(
            slug.as_str().to_string(),
            CacheEntry {
                record: record.clone(),
                fetched_at: Instant::now(),
            },
        );
    }
}

#[async_trait]
impl<L: TenantLookup> TenantLookup for CachedTenantLookup<L> {
    async fn find_tenant_by_slug(
        &self,
        slug: &TenantSlug,
    ) -> Result<Option<TenantRecord>, LookupError> {
        if let Some(record) = self.cached(slug) {
            debug!(tenant = %slug, "tenant lookup served from cache");
            return Ok(record);
        }

        let record = self.inner.find_tenant_by_slug(slug).await?;
        self.store(slug, &record);
        Ok(record)
    }
}
