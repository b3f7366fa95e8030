//! Link generation: route descriptor + params → URL string.
//!
//! # Responsibilities
//! - Resolve the target app's link settings (cached, cross-app via `ConfigSource`)
//! - Substitute aliases with their canonical "Controller[:action]" target
//! - Build the controller segment (cached per app and raw input)
//! - Serialize parameters per URL grammar, optionally encrypting them
//!
//! # Data Flow
//! ```text
//! Link { controller, params, encrypt, app, base }
//!     → RouteCaches::url_config(target app)
//!     → AliasTable::resolve → split "Controller:action"
//!     → RouteCaches::controller_uri(target app, input)
//!     → param segment (join / form-encode / key-value) → Cipher (optional)
//!     → base + controller segment + params + ext
//! ```
//!
//! # Design Decisions
//! - Parameter names come from the route table of the current app only;
//!   links into other apps bind nothing by name
//! - A link with params but no action carries the default action explicitly,
//!   so the first value is never read back as the action
//! - A link with params but no controller targets the target app's
//!   `default_route`
//! - Every grammar violation is an error; a broken link is never emitted

use std::borrow::Cow;
use std::sync::Arc;

use url::form_urlencoded;

use crate::cache::{LinkConfig, RouteCaches};
use crate::codec::{bind, bindable_names, flatten, join_escaped, ParamMap, Params, Scalar};
use crate::config::validation::is_identifier;
use crate::config::{AppConfig, ConfigError, ConfigSource, UrlConfig, UrlType};
use crate::error::{CodecError, RouteError, RouteResult};
use crate::observability::metrics;
use crate::routing::alias::AliasTable;
use crate::routing::descriptor::{capitalize, split_target, DEFAULT_ACTION};
use crate::routing::table::RouteTable;

/// A link request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Link {
    /// Alias, "Controller" or "Controller:action"; `None` links to the base.
    pub controller: Option<String>,
    pub params: Params,
    pub encrypt: bool,
    /// Target app; the current app when `None`.
    pub app: Option<String>,
    /// Explicit base link replacing the configured one.
    pub base: Option<String>,
}

impl Link {
    pub fn to(controller: impl Into<String>) -> Self {
        Self {
            controller: Some(controller.into()),
            ..Self::default()
        }
    }

    pub fn params(mut self, params: impl Into<Params>) -> Self {
        self.params = params.into();
        self
    }

    pub fn encrypted(mut self, encrypt: bool) -> Self {
        self.encrypt = encrypt;
        self
    }

    pub fn in_app(mut self, app: impl Into<String>) -> Self {
        self.app = Some(app.into());
        self
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }
}

/// Link generator bound to one app's configuration and handler table.
pub struct Encoder<'a> {
    app: &'a str,
    config: &'a AppConfig,
    table: &'a RouteTable,
    caches: &'a RouteCaches,
    source: Option<&'a dyn ConfigSource>,
}

impl<'a> Encoder<'a> {
    pub fn new(
        app: &'a str,
        config: &'a AppConfig,
        table: &'a RouteTable,
        caches: &'a RouteCaches,
    ) -> Self {
        Self {
            app,
            config,
            table,
            caches,
            source: None,
        }
    }

    /// Source used to load other apps' configuration for cross-app links.
    pub fn with_source(mut self, source: Option<&'a dyn ConfigSource>) -> Self {
        self.source = source;
        self
    }

    /// Build the URL for `link`.
    pub fn encode(&self, link: &Link) -> RouteResult<String> {
        let target = link.app.as_deref().unwrap_or(self.app);
        let settings = self.link_config(target)?;
        let url = &settings.url;

        let mut out = match &link.base {
            Some(base) => base.clone(),
            None => url.link_base(),
        };

        let input = match link.controller.as_deref().filter(|c| !c.is_empty()) {
            Some(input) => input,
            None if link.params.is_empty() => return Ok(out),
            None if url.default_route.is_empty() => {
                return Err(CodecError::MissingController.into())
            }
            None => url.default_route.as_str(),
        };

        let (name, action) = self.canonical(target, url, input)?;
        let uri = self.caches.controller_uri(target, input, || {
            Ok::<_, RouteError>(controller_uri(url, &name, action.as_deref()))
        })?;
        out.push_str(&uri);
        if action.is_none() && !link.params.is_empty() {
            out.push_str(&url.dot);
            out.push_str(DEFAULT_ACTION);
        }

        let mut names: Vec<&str> = Vec::new();
        if target == self.app {
            let declared = self
                .table
                .param_names(&capitalize(&name), action.as_deref().unwrap_or(DEFAULT_ACTION));
            names = bindable_names(declared, url.router_addition_params.keys());
        }

        let query = url.kind == UrlType::QueryString;
        if query {
            out.push_str(&url.ext);
        }

        if !link.params.is_empty() {
            let mut segment = param_segment(url, &link.params, &names)?;
            if link.encrypt {
                segment = settings.cipher.encrypt(&segment);
            }
            if query {
                out.push('?');
            } else {
                out.push_str(&url.dot);
            }
            out.push_str(&segment);
        }

        if !query {
            out.push_str(&url.ext);
        }

        metrics::record_link(url.kind, link.encrypt);
        tracing::debug!(app = target, url_type = %url.kind, encrypted = link.encrypt, link = %out, "Link built");
        Ok(out)
    }

    fn link_config(&self, target: &str) -> RouteResult<Arc<LinkConfig>> {
        self.caches.url_config(target, || {
            let config = self.app_config(target)?;
            Ok::<_, RouteError>(LinkConfig::from_app(&config))
        })
    }

    fn aliases(&self, target: &str) -> RouteResult<Arc<AliasTable>> {
        self.caches.alias_table(target, || {
            let config = self.app_config(target)?;
            Ok::<_, RouteError>(AliasTable::build(&config.router))
        })
    }

    fn app_config(&self, target: &str) -> Result<Cow<'a, AppConfig>, ConfigError> {
        if target == self.app {
            return Ok(Cow::Borrowed(self.config));
        }
        let source = self
            .source
            .ok_or_else(|| ConfigError::UnknownApp(target.to_string()))?;
        let config = source.load(target)?;
        tracing::info!(app = self.app, target, "Loaded configuration for cross-app links");
        Ok(Cow::Owned(config))
    }

    /// Alias-resolved, validated (controller, action) for a raw input.
    fn canonical(
        &self,
        target: &str,
        url: &UrlConfig,
        input: &str,
    ) -> RouteResult<(String, Option<String>)> {
        let aliases = self.aliases(target)?;
        let (controller, action) = split_target(aliases.resolve(input));
        let action = action.filter(|a| !a.is_empty());

        for part in std::iter::once(controller).chain(action) {
            if !is_identifier(part) {
                return Err(CodecError::InvalidIdentifier(part.to_string()).into());
            }
            if part.contains(url.dot.as_str()) {
                return Err(CodecError::UnsafeSeparator {
                    value: part.to_string(),
                    separator: url.dot.clone(),
                }
                .into());
            }
        }

        Ok((controller.to_string(), action.map(str::to_string)))
    }
}

/// Index prefix plus "Controller[dot action]".
fn controller_uri(url: &UrlConfig, controller: &str, action: Option<&str>) -> String {
    let mut uri = String::new();
    if !url.rewrite {
        if url.kind.is_query_routed() {
            if url.has_default_index() {
                uri.push_str("?/");
            } else {
                uri.push_str(&url.index);
                uri.push('?');
            }
        } else {
            uri.push_str(&url.index);
            uri.push('/');
        }
    }

    uri.push_str(controller);
    if let Some(action) = action {
        uri.push_str(&url.dot);
        uri.push_str(action);
    }
    uri
}

/// Serialize `params` in the grammar of `url.kind`, without any leading separator.
fn param_segment(url: &UrlConfig, params: &Params, names: &[&str]) -> Result<String, CodecError> {
    let dot = url.dot.as_str();
    let segment = match url.kind {
        UrlType::QueryPositional | UrlType::PathPositional => {
            let values = match params {
                Params::Map(map) => flatten(map, names)?,
                other => other.values(),
            };
            join_escaped(values.iter().map(Scalar::as_str), dot)
        }
        UrlType::QueryKeyed | UrlType::PathKeyed => match keyed(params, names) {
            Some(map) => join_escaped(map.iter().flat_map(|(k, v)| [k, v.as_str()]), dot),
            None => join_escaped(params.values().iter().map(Scalar::as_str), dot),
        },
        UrlType::QueryString => {
            let map = match params {
                Params::Map(map) => map.clone(),
                other => bind(&other.values(), names),
            };
            form_urlencoded::Serializer::new(String::new())
                .extend_pairs(map.iter().map(|(k, v)| (k, v.as_str())))
                .finish()
        }
    };
    Ok(segment)
}

/// Key/value view of `params` for the keyed grammars; `None` emits values flat.
fn keyed(params: &Params, names: &[&str]) -> Option<ParamMap> {
    match params {
        Params::Map(map) => Some(map.clone()),
        Params::List(values) if !names.is_empty() => Some(bind(values, names)),
        _ => None,
    }
}
