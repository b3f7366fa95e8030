//! Metrics collection.
//!
//! # Metrics
//! - `route_cache_hits_total` (counter): cache lookups served from memory, by cache
//! - `route_cache_misses_total` (counter): cache lookups that computed a value, by cache
//! - `route_cache_invalidations_total` (counter): explicit invalidations, by cache
//! - `route_links_total` (counter): generated links, by url type and encryption
//! - `route_decode_failures_total` (counter): failed decodes, by error kind
//! - `route_response_cache_total` (counter): dispatcher response cache lookups, by result
//!
//! # Design Decisions
//! - Labels are static strings or small enums to keep cardinality bounded
//! - App names are not used as labels

use crate::config::UrlType;

pub fn record_cache_hit(cache: &'static str) {
    ::metrics::counter!("route_cache_hits_total", "cache" => cache).increment(1);
}

pub fn record_cache_miss(cache: &'static str) {
    ::metrics::counter!("route_cache_misses_total", "cache" => cache).increment(1);
}

pub fn record_cache_invalidation(cache: &'static str) {
    ::metrics::counter!("route_cache_invalidations_total", "cache" => cache).increment(1);
}

pub fn record_link(kind: UrlType, encrypted: bool) {
    ::metrics::counter!(
        "route_links_total",
        "type" => kind.to_string(),
        "encrypted" => if encrypted { "true" } else { "false" }
    )
    .increment(1);
}

pub fn record_decode_failure(kind: &'static str) {
    ::metrics::counter!("route_decode_failures_total", "kind" => kind).increment(1);
}

pub fn record_response_cache(result: &'static str) {
    ::metrics::counter!("route_response_cache_total", "result" => result).increment(1);
}
