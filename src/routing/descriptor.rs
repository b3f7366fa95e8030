//! Route descriptors and the inbound route specification forms.

use std::fmt;

use serde::Serialize;

use crate::codec::Params;

/// Action used when a route names none.
pub const DEFAULT_ACTION: &str = "index";

/// Resolved (controller, action, params) triple identifying a request target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDescriptor {
    /// Capitalized, never empty after decoding.
    pub controller: String,
    pub action: String,
    pub params: Params,
}

impl RouteDescriptor {
    pub fn new(
        controller: impl Into<String>,
        action: impl Into<String>,
        params: impl Into<Params>,
    ) -> Self {
        Self {
            controller: controller.into(),
            action: action.into(),
            params: params.into(),
        }
    }

    /// "Controller:action".
    pub fn target(&self) -> String {
        format!("{}:{}", self.controller, self.action)
    }
}

impl fmt::Display for RouteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.controller, self.action)
    }
}

/// The forms an inbound route can take before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteSpec {
    /// An already-built descriptor.
    Descriptor(RouteDescriptor),
    /// "Controller" or "Controller:action"; params come from the call's args.
    Target(String),
    /// Loose parts, as produced by the URL parser or a host's request map.
    Parts {
        controller: String,
        action: Option<String>,
        params: Params,
    },
}

impl From<&str> for RouteSpec {
    fn from(target: &str) -> Self {
        RouteSpec::Target(target.to_string())
    }
}

impl From<String> for RouteSpec {
    fn from(target: String) -> Self {
        RouteSpec::Target(target)
    }
}

impl From<RouteDescriptor> for RouteSpec {
    fn from(descriptor: RouteDescriptor) -> Self {
        RouteSpec::Descriptor(descriptor)
    }
}

/// Split "Controller:action" into its parts.
pub fn split_target(target: &str) -> (&str, Option<&str>) {
    match target.split_once(':') {
        Some((controller, action)) => (controller, Some(action)),
        None => (target, None),
    }
}

/// Uppercase the first character.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
