//! Dispatch of decoded routes to their handlers, with optional response caching.

use std::sync::Arc;

use crate::cache::ResponseCache;
use crate::codec::Params;
use crate::error::{CodecError, RouteResult};
use crate::observability::metrics;
use crate::routing::descriptor::{RouteDescriptor, RouteSpec};
use crate::routing::router::Router;

/// Invokes handlers for decoded routes.
pub struct Dispatcher {
    router: Arc<Router>,
    cache: Option<Arc<dyn ResponseCache>>,
}

impl Dispatcher {
    pub fn new(router: Arc<Router>) -> Self {
        Self {
            router,
            cache: None,
        }
    }

    /// Memoize responses of actions that declare a cache lifetime.
    pub fn with_cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    /// Decode `spec` and run its handler.
    pub fn dispatch(&self, spec: impl Into<RouteSpec>, args: Params) -> RouteResult<String> {
        let decoded = self.router.decode(spec, args)?;
        let route = &decoded.route;

        let cached = self
            .cache
            .as_ref()
            .zip(decoded.resolved.meta.cache_ttl);
        let Some((cache, ttl)) = cached else {
            return decoded.resolved.handler.call(route);
        };

        let key = cache_key(self.router.app(), route)?;
        if let Some(body) = cache.get(&key) {
            metrics::record_response_cache("hit");
            tracing::debug!(key = %key, "Response served from cache");
            return Ok(body);
        }

        metrics::record_response_cache("miss");
        let body = decoded.resolved.handler.call(route)?;
        cache.set(&key, body.clone(), ttl);
        tracing::debug!(key = %key, ttl_secs = ttl.as_secs(), "Response cached");
        Ok(body)
    }

    /// Parse, decode and dispatch an inbound URL.
    pub fn dispatch_url(&self, url: &str, encrypted: bool) -> RouteResult<String> {
        let spec = self.router.parse_url(url, encrypted)?;
        self.dispatch(spec, Params::Empty)
    }
}

/// Response cache key: `app/controller/action[/blake3(params)]`, controller lowercased.
pub fn cache_key(app: &str, route: &RouteDescriptor) -> RouteResult<String> {
    let mut key = format!("{app}/{}/{}", route.controller.to_lowercase(), route.action);
    if !route.params.is_empty() {
        let serialized = serde_json::to_vec(&route.params)
            .map_err(|e| CodecError::Malformed(format!("unserializable params: {e}")))?;
        key.push('/');
        key.push_str(blake3::hash(&serialized).to_hex().as_str());
    }
    Ok(key)
}
