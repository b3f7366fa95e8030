//! Link-generation memo tables.
//!
//! # Responsibilities
//! - Memoize per-app `UrlConfig` (with the cipher its encrypted links use)
//! - Memoize per-(app, raw controller input) controller URI segments
//! - Memoize per-app alias tables
//! - Provide one invalidation entry point per table
//!
//! # Design Decisions
//! - First access for a key is a critical section: the value is computed
//!   while the shard entry is held, so racing threads never store a partial
//!   or duplicate value
//! - A compute closure must not touch the same table it is filling
//! - Owned by a router context and injected, never global

use std::hash::Hash;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::codec::Cipher;
use crate::config::{AppConfig, UrlConfig};
use crate::observability::metrics;
use crate::routing::alias::AliasTable;

const URL_CONFIG: &str = "url_config";
const CONTROLLER_URI: &str = "controller_uri";
const ALIAS: &str = "alias";

/// URL settings of an app together with its link cipher.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    pub url: UrlConfig,
    pub cipher: Cipher,
}

impl LinkConfig {
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            url: config.url.clone(),
            cipher: Cipher::new(&config.cipher.key),
        }
    }
}

/// The three memo tables used while generating links.
#[derive(Debug, Default)]
pub struct RouteCaches {
    url_configs: DashMap<String, Arc<LinkConfig>>,
    controller_uris: DashMap<(String, String), Arc<str>>,
    aliases: DashMap<String, Arc<AliasTable>>,
}

impl RouteCaches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached link settings for `app`, computed by `load` on first access.
    pub fn url_config<E, F>(&self, app: &str, load: F) -> Result<Arc<LinkConfig>, E>
    where
        F: FnOnce() -> Result<LinkConfig, E>,
    {
        get_or_try_insert(&self.url_configs, app.to_string(), URL_CONFIG, || {
            load().map(Arc::new)
        })
    }

    /// Cached controller URI for (`app`, raw `input`), computed by `build` on first access.
    pub fn controller_uri<E, F>(&self, app: &str, input: &str, build: F) -> Result<Arc<str>, E>
    where
        F: FnOnce() -> Result<String, E>,
    {
        let key = (app.to_string(), input.to_string());
        get_or_try_insert(&self.controller_uris, key, CONTROLLER_URI, || {
            build().map(Arc::from)
        })
    }

    /// Cached alias table for `app`, computed by `build` on first access.
    pub fn alias_table<E, F>(&self, app: &str, build: F) -> Result<Arc<AliasTable>, E>
    where
        F: FnOnce() -> Result<AliasTable, E>,
    {
        get_or_try_insert(&self.aliases, app.to_string(), ALIAS, || build().map(Arc::new))
    }

    /// Drop the cached link settings for `app`.
    pub fn invalidate_url_config(&self, app: &str) {
        self.url_configs.remove(app);
        metrics::record_cache_invalidation(URL_CONFIG);
    }

    /// Drop every cached controller URI for `app`.
    pub fn invalidate_controller_uris(&self, app: &str) {
        self.controller_uris.retain(|(cached_app, _), _| cached_app != app);
        metrics::record_cache_invalidation(CONTROLLER_URI);
    }

    /// Drop the cached alias table for `app`.
    pub fn invalidate_aliases(&self, app: &str) {
        self.aliases.remove(app);
        metrics::record_cache_invalidation(ALIAS);
    }

    /// Invalidate all three tables for `app`; the path a config reload takes.
    pub fn invalidate_app(&self, app: &str) {
        self.invalidate_url_config(app);
        self.invalidate_controller_uris(app);
        self.invalidate_aliases(app);
        tracing::info!(app, "Link caches invalidated");
    }

    /// Number of cached controller URIs (all apps).
    pub fn controller_uri_count(&self) -> usize {
        self.controller_uris.len()
    }

    pub fn has_url_config(&self, app: &str) -> bool {
        self.url_configs.contains_key(app)
    }

    pub fn has_alias_table(&self, app: &str) -> bool {
        self.aliases.contains_key(app)
    }
}

fn get_or_try_insert<K, V, E, F>(
    map: &DashMap<K, Arc<V>>,
    key: K,
    cache: &'static str,
    compute: F,
) -> Result<Arc<V>, E>
where
    K: Eq + Hash,
    V: ?Sized,
    F: FnOnce() -> Result<Arc<V>, E>,
{
    if let Some(hit) = map.get(&key) {
        metrics::record_cache_hit(cache);
        return Ok(Arc::clone(hit.value()));
    }

    match map.entry(key) {
        Entry::Occupied(entry) => {
            metrics::record_cache_hit(cache);
            Ok(Arc::clone(entry.get()))
        }
        Entry::Vacant(entry) => {
            metrics::record_cache_miss(cache);
            let value = compute()?;
            entry.insert(Arc::clone(&value));
            tracing::debug!(cache, "Cache filled");
            Ok(value)
        }
    }
}
