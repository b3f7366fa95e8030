//! Configuration schema definitions.
//!
//! This module defines the per-app configuration consumed by the router.
//! All types derive Serde traits for deserialization from TOML files.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::codec::ParamMap;

/// Root configuration for one app.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Link grammar and base settings.
    pub url: UrlConfig,

    /// Alias table: alias name → canonical "Controller[:action]".
    pub router: BTreeMap<String, String>,

    /// Key material for encrypted links.
    pub cipher: CipherConfig,

    /// Declarative controller/action metadata.
    pub controllers: BTreeMap<String, ControllerConfig>,
}

/// One of the five fixed URL grammars.
///
/// ```text
/// 1: /?/Controller/action/p1/p2/p3
/// 2: /index.php/Controller/action?p1=a&p2=b
/// 3: /?/Controller/action/k1/v1/k2/v2
/// 4: /index.php/Controller/action/k1/v1/k2/v2
/// 5: /index.php/Controller/action/p1/p2/p3
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum UrlType {
    #[default]
    QueryPositional = 1,
    QueryString = 2,
    QueryKeyed = 3,
    PathKeyed = 4,
    PathPositional = 5,
}

impl UrlType {
    pub const ALL: [UrlType; 5] = [
        UrlType::QueryPositional,
        UrlType::QueryString,
        UrlType::QueryKeyed,
        UrlType::PathKeyed,
        UrlType::PathPositional,
    ];

    /// Types 1 and 5: values joined by the separator.
    pub fn is_positional(self) -> bool {
        matches!(self, UrlType::QueryPositional | UrlType::PathPositional)
    }

    /// Types 3 and 4: alternating key and value segments.
    pub fn is_keyed(self) -> bool {
        matches!(self, UrlType::QueryKeyed | UrlType::PathKeyed)
    }

    /// Types 1 and 3 route through the query string of the index file.
    pub fn is_query_routed(self) -> bool {
        matches!(self, UrlType::QueryPositional | UrlType::QueryKeyed)
    }
}

impl TryFrom<u8> for UrlType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(UrlType::QueryPositional),
            2 => Ok(UrlType::QueryString),
            3 => Ok(UrlType::QueryKeyed),
            4 => Ok(UrlType::PathKeyed),
            5 => Ok(UrlType::PathPositional),
            other => Err(format!("unsupported url type {other} (expected 1-5)")),
        }
    }
}

impl From<UrlType> for u8 {
    fn from(value: UrlType) -> Self {
        value as u8
    }
}

impl fmt::Display for UrlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

/// Default index filename.
pub const DEFAULT_INDEX: &str = "index.php";

/// URL configuration for an app.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct UrlConfig {
    /// Grammar used to serialize parameters.
    #[serde(rename = "type")]
    pub kind: UrlType,

    /// Separator between controller, action and parameter segments.
    pub dot: String,

    /// Optional suffix (e.g. ".html").
    pub ext: String,

    /// Emit the controller without the index file prefix.
    pub rewrite: bool,

    /// Index filename.
    pub index: String,

    /// Scheme and host (e.g. "https://example.com").
    pub host: String,

    /// Base URL prefixed to every generated link.
    pub full_request: String,

    /// Route used when an inbound URL names no controller.
    pub default_route: String,

    /// Parameters injected into every resolved route.
    pub router_addition_params: ParamMap,
}

impl Default for UrlConfig {
    fn default() -> Self {
        Self {
            kind: UrlType::QueryPositional,
            dot: "/".to_string(),
            ext: String::new(),
            rewrite: false,
            index: DEFAULT_INDEX.to_string(),
            host: String::new(),
            full_request: String::new(),
            default_route: "Main:index".to_string(),
            router_addition_params: ParamMap::new(),
        }
    }
}

impl UrlConfig {
    /// Base every link starts with, always ending in a single `/`.
    pub fn link_base(&self) -> String {
        let base = if self.full_request.is_empty() {
            self.host.as_str()
        } else {
            self.full_request.as_str()
        };
        format!("{}/", base.trim_end_matches('/'))
    }

    /// True when the index filename is the default one (case-insensitive).
    pub fn has_default_index(&self) -> bool {
        self.index.eq_ignore_ascii_case(DEFAULT_INDEX)
    }
}

/// Cipher configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CipherConfig {
    /// Secret for the parameter cipher.
    pub key: String,
}

impl Default for CipherConfig {
    fn default() -> Self {
        Self {
            // WARNING: placeholder, set a per-deployment key.
            key: "route-codec".to_string(),
        }
    }
}

/// Declarative metadata for one controller.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ControllerConfig {
    /// Abstract controllers are never dispatched.
    #[serde(rename = "abstract")]
    pub is_abstract: bool,

    /// Route unknown actions to the controller's default handler.
    pub fallback: bool,

    pub actions: BTreeMap<String, ActionConfig>,
}

/// Declarative metadata for one action.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ActionConfig {
    /// Ordered parameter names used to bind positional values.
    pub params: Vec<String>,

    pub public: bool,

    #[serde(rename = "abstract")]
    pub is_abstract: bool,

    /// Response cache lifetime; absent or zero disables caching.
    pub cache_ttl_secs: Option<u64>,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            params: Vec::new(),
            public: true,
            is_abstract: false,
            cache_ttl_secs: None,
        }
    }
}
