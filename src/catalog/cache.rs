//! Caché del catálogo con TTL explícito
//!
//! Una entrada guarda el valor y el momento en que se obtuvo. Solo se
//! reutiliza mientras su edad sea menor que el TTL; un `put` siempre
//! sobrescribe valor y timestamp.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::models::vehicle::Vehicle;

/// Clave única del listado completo
pub const CATALOG_KEY: &str = "catalog";

/// Ventana de frescura por defecto (10 minutos)
pub const DEFAULT_TTL_SECONDS: i64 = 10 * 60;

#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct TtlCache<V> {
    entries: HashMap<String, CacheEntry<V>>,
    ttl: Duration,
}

pub type CatalogCache = TtlCache<Vec<Vehicle>>;

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_TTL_SECONDS))
    }
}

impl<V> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Entrada si todavía es fresca en `now`
    pub fn get_fresh(&self, key: &str, now: DateTime<Utc>) -> Option<&CacheEntry<V>> {
        self.entries
            .get(key)
            .filter(|entry| now.signed_duration_since(entry.fetched_at) < self.ttl)
    }

    pub fn put(&mut self, key: &str, value: V, now: DateTime<Utc>) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                fetched_at: now,
            },
        );
    }

    pub fn invalidate(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_expires_after_ttl() {
        let mut cache: TtlCache<Vec<i32>> = TtlCache::default();
        let t0 = Utc::now();
        cache.put(CATALOG_KEY, vec![1, 2], t0);

        assert!(cache.get_fresh(CATALOG_KEY, t0 + Duration::minutes(9)).is_some());
        assert!(cache.get_fresh(CATALOG_KEY, t0 + Duration::minutes(10)).is_none());
    }

    #[test]
    fn test_put_overwrites_value_and_timestamp() {
        let mut cache: TtlCache<&str> = TtlCache::new(Duration::seconds(60));
        let t0 = Utc::now();
        cache.put(CATALOG_KEY, "old", t0);
        cache.put(CATALOG_KEY, "new", t0 + Duration::seconds(50));

        let entry = cache.get_fresh(CATALOG_KEY, t0 + Duration::seconds(90)).unwrap();
        assert_eq!(entry.value, "new");
    }

    #[test]
    fn test_invalidate() {
        let mut cache: TtlCache<u8> = TtlCache::default();
        cache.put(CATALOG_KEY, 1, Utc::now());
        assert!(cache.invalidate(CATALOG_KEY));
        assert!(!cache.invalidate(CATALOG_KEY));
        assert!(cache.get_fresh(CATALOG_KEY, Utc::now()).is_none());
    }
}
