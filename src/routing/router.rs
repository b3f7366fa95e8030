//! Per-app router context.
//!
//! # Responsibilities
//! - Own the app's configuration, handler table and link caches
//! - Decode inbound routes and URLs into resolved descriptors
//! - Generate links (plain, encrypted, cross-app)
//! - Apply configuration reloads together with cache invalidation
//!
//! # Design Decisions
//! - Configuration is swapped atomically (`ArcSwap`); readers never block
//!   each other
//! - A reload holds the write side of `reload_lock` while it swaps the
//!   config and invalidates the caches, so no link is cached from the old
//!   config after the new one is visible
//! - Caches are injected; several routers (one per app) may share them

use std::convert::Infallible;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard};

use arc_swap::ArcSwap;

use crate::cache::RouteCaches;
use crate::codec::{Cipher, Params};
use crate::config::{AppConfig, ConfigSource};
use crate::error::{RouteError, RouteResult};
use crate::observability::metrics;
use crate::routing::alias::AliasTable;
use crate::routing::decoder::{Decoded, Decoder};
use crate::routing::descriptor::RouteSpec;
use crate::routing::encoder::{Encoder, Link};
use crate::routing::parser::UrlParser;
use crate::routing::table::RouteTable;

/// Routing context for one app.
pub struct Router {
    app: String,
    config: ArcSwap<AppConfig>,
    table: Arc<RouteTable>,
    caches: Arc<RouteCaches>,
    source: Option<Arc<dyn ConfigSource>>,
    reload_lock: RwLock<()>,
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("app", &self.app)
            .field("url_type", &self.config.load().url.kind)
            .finish_non_exhaustive()
    }
}

impl Router {
    pub fn new(app: impl Into<String>, config: AppConfig, table: RouteTable) -> Self {
        Self {
            app: app.into(),
            config: ArcSwap::from_pointee(config),
            table: Arc::new(table),
            caches: Arc::new(RouteCaches::new()),
            source: None,
            reload_lock: RwLock::new(()),
        }
    }

    /// Share link caches with other routers.
    pub fn with_caches(mut self, caches: Arc<RouteCaches>) -> Self {
        self.caches = caches;
        self
    }

    /// Source of other apps' configuration, used for cross-app links.
    pub fn with_source(mut self, source: Arc<dyn ConfigSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn app(&self) -> &str {
        &self.app
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> Arc<AppConfig> {
        self.config.load_full()
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn caches(&self) -> &Arc<RouteCaches> {
        &self.caches
    }

    // ----- links -----

    /// Build a link.
    pub fn encode(&self, link: &Link) -> RouteResult<String> {
        let _guard = self.read_guard();
        let config = self.config.load_full();
        Encoder::new(&self.app, &config, &self.table, &self.caches)
            .with_source(self.source.as_deref())
            .encode(link)
    }

    /// Link to `controller` with `params`.
    pub fn url(&self, controller: &str, params: impl Into<Params>) -> RouteResult<String> {
        self.encode(&Link::to(controller).params(params))
    }

    /// Link to `controller` with the parameter segment encrypted.
    pub fn secure_url(&self, controller: &str, params: impl Into<Params>) -> RouteResult<String> {
        self.encode(&Link::to(controller).params(params).encrypted(true))
    }

    /// Link into another app, optionally under an explicit base link.
    pub fn app_url(
        &self,
        base_link: Option<&str>,
        app: &str,
        controller: &str,
        params: impl Into<Params>,
        encrypt: bool,
    ) -> RouteResult<String> {
        let mut link = Link::to(controller)
            .params(params)
            .encrypted(encrypt)
            .in_app(app);
        link.base = base_link.map(str::to_string);
        self.encode(&link)
    }

    /// The base every link of this app starts with.
    pub fn link_base(&self) -> String {
        self.config.load().url.link_base()
    }

    /// Forget cached controller URIs for this app.
    pub fn clean_link_cache(&self) {
        self.caches.invalidate_controller_uris(&self.app);
    }

    // ----- decoding -----

    /// Decode a route spec, with `args` as params when the spec has none.
    pub fn decode(&self, spec: impl Into<RouteSpec>, args: Params) -> RouteResult<Decoded<'_>> {
        let _guard = self.read_guard();
        let config = self.config.load_full();
        let aliases = self.aliases(&config);
        self.decode_with(&config, &aliases, spec.into(), args)
    }

    /// Parse an inbound URL into a raw route spec.
    pub fn parse_url(&self, url: &str, encrypted: bool) -> RouteResult<RouteSpec> {
        let _guard = self.read_guard();
        let config = self.config.load_full();
        let aliases = self.aliases(&config);
        self.parse_with(&config, &aliases, url, encrypted)
    }

    /// Parse and decode an inbound URL against a single configuration snapshot.
    pub fn decode_url(&self, url: &str, encrypted: bool) -> RouteResult<Decoded<'_>> {
        let _guard = self.read_guard();
        let config = self.config.load_full();
        let aliases = self.aliases(&config);
        let spec = self.parse_with(&config, &aliases, url, encrypted)?;
        self.decode_with(&config, &aliases, spec, Params::Empty)
    }

    /// Recover the plaintext parameter segment from a cipher token.
    pub fn decrypt_params(&self, token: &str) -> RouteResult<String> {
        let _guard = self.read_guard();
        let config = self.config.load_full();
        Cipher::new(&config.cipher.key)
            .decrypt(token)
            .map_err(RouteError::from)
            .inspect_err(|e| self.record_failure(e))
    }

    // ----- reload -----

    /// Replace the configuration and invalidate every cache of this app.
    pub fn reload(&self, config: AppConfig) {
        let _guard = self
            .reload_lock
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let url_type = config.url.kind;
        self.config.store(Arc::new(config));
        self.caches.invalidate_app(&self.app);
        tracing::info!(app = %self.app, url_type = %url_type, "Router configuration reloaded");
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, ()> {
        self.reload_lock
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Callers hold the read guard.
    fn aliases(&self, config: &AppConfig) -> Arc<AliasTable> {
        let built = self
            .caches
            .alias_table(&self.app, || Ok::<_, Infallible>(AliasTable::build(&config.router)));
        match built {
            Ok(table) => table,
            Err(never) => match never {},
        }
    }

    fn parse_with(
        &self,
        config: &AppConfig,
        aliases: &AliasTable,
        url: &str,
        encrypted: bool,
    ) -> RouteResult<RouteSpec> {
        let cipher = Cipher::new(&config.cipher.key);
        UrlParser::new(&config.url, aliases, &cipher)
            .parse(url, encrypted)
            .inspect_err(|e| self.record_failure(e))
    }

    fn decode_with(
        &self,
        config: &AppConfig,
        aliases: &AliasTable,
        spec: RouteSpec,
        args: Params,
    ) -> RouteResult<Decoded<'_>> {
        Decoder::new(config, aliases, &self.table)
            .decode(spec, args)
            .inspect_err(|e| self.record_failure(e))
    }

    fn record_failure(&self, error: &RouteError) {
        metrics::record_decode_failure(error.kind());
        if error.is_tampering() {
            tracing::warn!(app = %self.app, error = %error, "Rejected tampered parameter token");
        } else {
            tracing::warn!(app = %self.app, error = %error, "Route rejected");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::config::UrlType;
    use crate::routing::table::{ActionMeta, Controller, Handler};

    fn router(kind: UrlType) -> Router {
        let mut config = AppConfig::default();
        config.url.kind = kind;
        let echo = Handler::new(|route| Ok(route.target()));
        let table = RouteTable::new().with(
            Controller::new("Main")
                .action("index", echo.clone())
                .action_with("show", ActionMeta::new().params(["id"]), echo),
        );
        Router::new("web", config, table)
    }

    #[test]
    fn test_url_then_decode_url() {
        let router = router(UrlType::PathPositional);
        let link = router.url("Main:show", Params::list(["42"])).unwrap();
        assert_eq!(link, "/index.php/Main/show/42");

        let decoded = router.decode_url(&link, false).unwrap();
        assert_eq!(decoded.route.target(), "Main:show");
        assert_eq!(decoded.route.params, Params::map([("id", "42")]));
    }

    #[test]
    fn test_secure_url_round_trip() {
        let router = router(UrlType::QueryPositional);
        let link = router.secure_url("Main:index", Params::list(["a", "b"])).unwrap();
        let decoded = router.decode_url(&link, true).unwrap();
        assert_eq!(decoded.route.params, Params::list(["a", "b"]));

        let token = link.rsplit('/').next().unwrap();
        assert_eq!(router.decrypt_params(token).unwrap(), "a/b");
        assert!(router.decrypt_params("zz").unwrap_err().is_tampering());
    }

    #[test]
    fn test_reload_invalidates_caches() {
        let router = router(UrlType::QueryPositional);
        assert_eq!(router.url("Main", Params::Empty).unwrap(), "/?/Main");
        assert_eq!(router.caches().controller_uri_count(), 1);

        let mut next = AppConfig::default();
        next.url.kind = UrlType::PathKeyed;
        next.url.full_request = "https://example.com".into();
        router.reload(next);

        assert_eq!(router.caches().controller_uri_count(), 0);
        assert_eq!(
            router.url("Main", Params::Empty).unwrap(),
            "https://example.com/index.php/Main"
        );
        assert_eq!(router.link_base(), "https://example.com/");
    }

    #[test]
    fn test_clean_link_cache() {
        let router = router(UrlType::QueryPositional);
        router.url("Main:index", Params::Empty).unwrap();
        router.clean_link_cache();
        assert_eq!(router.caches().controller_uri_count(), 0);
    }

    /// Runs `op` on another thread while a reload holds the lock, and checks
    /// that it only completes once the lock is released.
    fn assert_waits_for_reload(router: &Router, op: impl FnOnce(&Router) + Send) {
        let write = router.reload_lock.write().unwrap();
        let (done_tx, done_rx) = mpsc::channel();
        thread::scope(|s| {
            s.spawn(move || {
                op(router);
                done_tx.send(()).unwrap();
            });
            assert!(done_rx.recv_timeout(Duration::from_millis(100)).is_err());
            drop(write);
            done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        });
    }

    #[test]
    fn test_decode_url_waits_for_reload() {
        let router = router(UrlType::PathPositional);
        assert_waits_for_reload(&router, |router| {
            let decoded = router.decode_url("/index.php/Main/show/42", false).unwrap();
            assert_eq!(decoded.route.params, Params::map([("id", "42")]));
        });
    }

    #[test]
    fn test_decrypt_params_waits_for_reload() {
        let router = router(UrlType::QueryPositional);
        let link = router.secure_url("Main:index", Params::list(["a"])).unwrap();
        let token = link.rsplit('/').next().unwrap().to_string();
        assert_waits_for_reload(&router, move |router| {
            assert_eq!(router.decrypt_params(&token).unwrap(), "a");
        });
    }
}
