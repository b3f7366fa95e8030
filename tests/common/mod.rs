//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use route_codec::config::{AppConfig, UrlType};
use route_codec::routing::{ActionMeta, Controller, Handler, RouteTable, Router};

pub const APP: &str = "test";

/// Echo handler: returns "Controller:action".
pub fn echo() -> Handler {
    Handler::new(|route| Ok(route.target()))
}

/// Main controller with one annotated and one plain action.
pub fn table() -> RouteTable {
    RouteTable::new().with(
        Controller::new("Main")
            .action("index", echo())
            .action("plain", echo())
            .action_with(
                "getUrlSecurityParams",
                ActionMeta::new().params(["p1", "p2", "p3"]),
                echo(),
            ),
    )
}

/// Default config with the given grammar (dot "/", no ext, no rewrite).
pub fn config(kind: UrlType) -> AppConfig {
    let mut config = AppConfig::default();
    config.url.kind = kind;
    config
}

pub fn router(kind: UrlType) -> Router {
    Router::new(APP, config(kind), table())
}

pub fn shared_router(config: AppConfig) -> Arc<Router> {
    Arc::new(Router::new(APP, config, table()))
}
