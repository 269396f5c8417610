//! Default website resolution.
//!
//! A user may register several websites. Exactly one of them is treated as
//! the default: the most recently created active one, falling back to the
//! most recently created one of any status.

use crate::models::Website;
use std::collections::HashMap;
use std::future::Future;
use tracing::debug;

/// A resource that can be switched on and off.
pub trait Activatable {
    fn is_active(&self) -> bool;
}

impl Activatable for Website {
    fn is_active(&self) -> bool {
        self.is_active
    }
}

/// Pick the default among `candidates`.
///
/// `candidates` must be ordered by creation time, newest first. Returns the
/// first active entry, else the first entry, else `None`.
pub fn resolve_default<T: Activatable>(candidates: &[T]) -> Option<&T> {
    candidates
        .iter()
        .find(|c| c.is_active())
        .or_else(|| candidates.first())
}

/// Cache of each user's resolved default website.
///
/// A resolved absence is cached too, so a user without websites is not
/// refetched until invalidated.
#[derive(Debug, Default)]
pub struct DefaultSiteCache {
    entries: HashMap<String, Option<Website>>,
}

impl DefaultSiteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached resolution for `user_id`; `None` on a miss.
    pub fn get(&self, user_id: &str) -> Option<&Option<Website>> {
        self.entries.get(user_id)
    }

    /// Cached default for `user_id`, calling `fetch` only on a miss.
    ///
    /// `fetch` must yield the user's websites newest first. A failed fetch
    /// leaves the cache untouched.
    pub async fn get_or_resolve<F, Fut, E>(
        &mut self,
        user_id: &str,
        fetch: F,
    ) -> Result<Option<Website>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Website>, E>>,
    {
        if let Some(cached) = self.get(user_id) {
            debug!("Default site cache hit for user {}", user_id);
            return Ok(cached.clone());
        }

        let candidates = fetch().await?;
        Ok(self.resolve(user_id, &candidates))
    }

    /// Resolve the default among `candidates` (newest first) and remember it.
    pub fn resolve(&mut self, user_id: &str, candidates: &[Website]) -> Option<Website> {
        let resolved = resolve_default(candidates).cloned();
        debug!(
            "Resolved default site for user {} from {} candidates: {:?}",
            user_id,
            candidates.len(),
            resolved.as_ref().map(|w| &w.id)
        );

        self.entries.insert(user_id.to_string(), resolved.clone());
        resolved
    }

    /// Forget the cached default for one user.
    #[allow(dead_code)] // Each CLI run builds a fresh cache
    pub fn invalidate(&mut self, user_id: &str) {
        self.entries.remove(user_id);
    }

    /// Forget every cached default.
    #[allow(dead_code)] // Each CLI run builds a fresh cache
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WidgetConfig;
    use chrono::{Duration, TimeZone, Utc};
    use std::cell::Cell;

    fn create_test_site(id: &str, active: bool, age_days: i64) -> Website {
        let base = Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap();
        Website {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            name: format!("Site {}", id),
            domain: format!("{}.example.com", id),
            is_active: active,
            created_at: base - Duration::days(age_days),
            widget_config: WidgetConfig::default(),
        }
    }

    #[test]
    fn test_first_active_in_order_wins() {
        let sites = vec![
            create_test_site("A", false, 1),
            create_test_site("B", true, 2),
            create_test_site("C", true, 3),
        ];

        assert_eq!(resolve_default(&sites).map(|s| s.id.as_str()), Some("B"));
    }

    #[test]
    fn test_falls_back_to_newest_when_none_active() {
        let sites = vec![create_test_site("A", false, 1)];
        assert_eq!(resolve_default(&sites).map(|s| s.id.as_str()), Some("A"));

        let sites = vec![create_test_site("A", false, 1), create_test_site("B", false, 2)];
        assert_eq!(resolve_default(&sites).map(|s| s.id.as_str()), Some("A"));
    }

    #[test]
    fn test_empty_has_no_default() {
        let sites: Vec<Website> = Vec::new();
        assert!(resolve_default(&sites).is_none());
    }

    #[test]
    fn test_cache_resolve_and_get() {
        let mut cache = DefaultSiteCache::new();
        assert!(cache.get("user-1").is_none());

        let sites = vec![create_test_site("A", false, 1), create_test_site("B", true, 2)];
        let resolved = cache.resolve("user-1", &sites);

        assert_eq!(resolved.map(|s| s.id), Some("B".to_string()));
        let cached = cache.get("user-1").and_then(|c| c.as_ref()).map(|s| s.id.as_str());
        assert_eq!(cached, Some("B"));
    }

    #[test]
    fn test_cache_remembers_absence_until_invalidated() {
        let mut cache = DefaultSiteCache::new();

        assert!(cache.resolve("user-1", &[]).is_none());
        assert!(matches!(cache.get("user-1"), Some(None)));

        cache.invalidate("user-1");
        assert!(cache.get("user-1").is_none());
    }

    #[test]
    fn test_get_or_resolve_fetches_only_on_miss() {
        let mut cache = DefaultSiteCache::new();
        let calls = Cell::new(0);
        let fetch = || {
            calls.set(calls.get() + 1);
            async { Ok::<_, String>(vec![create_test_site("A", true, 1)]) }
        };

        let first = tokio_test::block_on(cache.get_or_resolve("user-1", fetch)).unwrap();
        let second = tokio_test::block_on(cache.get_or_resolve("user-1", fetch)).unwrap();

        assert_eq!(first.map(|s| s.id), Some("A".to_string()));
        assert_eq!(second.map(|s| s.id), Some("A".to_string()));
        assert_eq!(calls.get(), 1);

        cache.clear();
        tokio_test::block_on(cache.get_or_resolve("user-1", fetch)).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_get_or_resolve_failure_is_not_cached() {
        let mut cache = DefaultSiteCache::new();

        let failed = tokio_test::block_on(
            cache.get_or_resolve("user-1", || async { Err::<Vec<Website>, _>("unreadable") }),
        );
        assert!(matches!(failed, Err("unreadable")));
        assert!(cache.get("user-1").is_none());
    }

    #[test]
    fn test_clear_drops_all_users() {
        let mut cache = DefaultSiteCache::new();
        cache.resolve("user-1", &[create_test_site("A", true, 1)]);
        cache.resolve("user-2", &[]);

        cache.clear();

        assert!(cache.get("user-1").is_none());
        assert!(cache.get("user-2").is_none());
    }
}
