//! TTL cache for paginated record listings.
//!
//! Keyed by the full set of query parameters that shape a listing page, so
//! two views that differ in any filter never share an entry. Every record
//! mutation invalidates the whole cache; for a single-writer store,
//! correctness beats retention.

use crate::models::record::RecordPage;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Composed lookup key for one cached page of records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub page: u64,
    pub page_size: u64,
    pub search: String,
    /// `None` = unfiltered, `Some("")` = unchanneled rows.
    pub channel: Option<String>,
    pub year_month: String,
}

struct CacheEntry {
    page: RecordPage,
    inserted_at: Instant,
}

/// Bounded TTL cache shared between listing handlers.
pub struct PageCache {
    ttl: Duration,
    capacity: usize,
    entries: Mutex<HashMap<PageKey, CacheEntry>>,
}

impl PageCache {
    /// Create a cache with the given entry TTL and capacity.
    ///
    /// A zero TTL or zero capacity disables caching entirely.
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn enabled(&self) -> bool {
        self.capacity > 0 && !self.ttl.is_zero()
    }

    /// Look up a cached page, dropping it when expired.
    pub fn get(&self, key: &PageKey) -> Option<RecordPage> {
        if !self.enabled() {
            return None;
        }
        let mut entries = self.entries.lock().ok()?;
        match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() <= self.ttl => {
                tracing::debug!(page = key.page, "page cache hit");
                Some(entry.page.clone())
            }
            Some(_) => {
                entries.remove(key);
                tracing::debug!(page = key.page, "page cache entry expired");
                None
            }
            None => {
                tracing::debug!(page = key.page, "page cache miss");
                None
            }
        }
    }

    /// Store a page, sweeping expired entries and evicting the oldest when
    /// full.
    pub fn insert(&self, key: PageKey, page: RecordPage) {
        if !self.enabled() {
            return;
        }
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.inserted_at.elapsed() <= ttl);

        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                page,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drop every cached page.
    pub fn invalidate_all(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            if !entries.is_empty() {
                tracing::debug!(dropped = entries.len(), "page cache invalidated");
            }
            entries.clear();
        }
    }

    /// Number of live entries (expired entries may still be counted until
    /// the next sweep).
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Whether the cache currently holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::{PageCache, PageKey};
    use crate::models::record::RecordPage;
    use std::time::Duration;

    fn key(page: u64) -> PageKey {
        PageKey {
            page,
            page_size: 6,
            search: String::new(),
            channel: None,
            year_month: String::new(),
        }
    }

    fn page_of(total: u64) -> RecordPage {
        RecordPage {
            records: Vec::new(),
            current_page: 1,
            total_pages: 1,
            total,
            search_keyword: None,
        }
    }

    #[test]
    fn get_returns_inserted_page_until_invalidated() {
        let cache = PageCache::new(Duration::from_secs(60), 8);
        cache.insert(key(1), page_of(10));

        let hit = cache.get(&key(1)).expect("cached page");
        assert_eq!(hit.total, 10);
        assert!(cache.get(&key(2)).is_none());

        cache.invalidate_all();
        assert!(cache.get(&key(1)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn keys_differing_in_any_filter_do_not_collide() {
        let cache = PageCache::new(Duration::from_secs(60), 8);
        cache.insert(key(1), page_of(1));

        let mut channel_key = key(1);
        channel_key.channel = Some(String::new());
        assert!(cache.get(&channel_key).is_none());

        let mut search_key = key(1);
        search_key.search = "cats".to_string();
        assert!(cache.get(&search_key).is_none());
    }

    #[test]
    fn entries_expire_after_ttl() {
        let cache = PageCache::new(Duration::from_millis(10), 8);
        cache.insert(key(1), page_of(1));
        std::thread::sleep(Duration::from_millis(30));
        assert!(cache.get(&key(1)).is_none());
    }

    #[test]
    fn oldest_entry_is_evicted_at_capacity() {
        let cache = PageCache::new(Duration::from_secs(60), 2);
        cache.insert(key(1), page_of(1));
        std::thread::sleep(Duration::from_millis(2));
        cache.insert(key(2), page_of(2));
        std::thread::sleep(Duration::from_millis(2));
        cache.insert(key(3), page_of(3));

        assert!(cache.get(&key(1)).is_none(), "oldest entry should be gone");
        assert!(cache.get(&key(2)).is_some());
        assert!(cache.get(&key(3)).is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn zero_ttl_or_capacity_disables_caching() {
        let no_ttl = PageCache::new(Duration::ZERO, 8);
        no_ttl.insert(key(1), page_of(1));
        assert!(no_ttl.get(&key(1)).is_none());

        let no_capacity = PageCache::new(Duration::from_secs(60), 0);
        no_capacity.insert(key(1), page_of(1));
        assert!(no_capacity.get(&key(1)).is_none());
    }
}
