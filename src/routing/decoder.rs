//! Route spec + args → resolved `RouteDescriptor`.
//!
//! # Data Flow
//! ```text
//! RouteSpec (descriptor | "Controller:action" | parts) + args
//!     → alias substitution, default route, capitalize, default action
//!     → RouteTable::resolve (handler, metadata or fallback)
//!     → bind values to the action's parameter names per grammar
//!     → merge router addition params (caller value wins)
//!     → Decoded { route, resolved }
//! ```

use crate::codec::{bind, bindable_names, merge_addition, pair, Params};
use crate::config::{AppConfig, UrlType};
use crate::error::{ResolutionError, RouteResult};
use crate::routing::alias::AliasTable;
use crate::routing::descriptor::{capitalize, split_target, RouteDescriptor, RouteSpec, DEFAULT_ACTION};
use crate::routing::table::{Resolved, RouteTable};

/// A decoded route and the handler that serves it.
#[derive(Debug, Clone)]
pub struct Decoded<'t> {
    pub route: RouteDescriptor,
    pub resolved: Resolved<'t>,
}

/// Decoder bound to one app's configuration, aliases and handler table.
pub struct Decoder<'c, 't> {
    config: &'c AppConfig,
    aliases: &'c AliasTable,
    table: &'t RouteTable,
}

impl<'c, 't> Decoder<'c, 't> {
    pub fn new(config: &'c AppConfig, aliases: &'c AliasTable, table: &'t RouteTable) -> Self {
        Self {
            config,
            aliases,
            table,
        }
    }

    /// Decode `spec`; `args` supply the params when the spec carries none.
    pub fn decode(&self, spec: RouteSpec, args: Params) -> RouteResult<Decoded<'t>> {
        let (controller, action, params) = self.normalize(spec, args);

        let (controller, action) = if controller.is_empty() {
            let (default_controller, default_action) = split_target(&self.config.url.default_route);
            (
                default_controller.to_string(),
                action.or_else(|| default_action.map(str::to_string)),
            )
        } else {
            (controller, action)
        };
        if controller.is_empty() {
            return Err(ResolutionError::NotFound { controller }.into());
        }

        let controller = capitalize(&controller);
        let action = action
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| DEFAULT_ACTION.to_string());

        let resolved = self.table.resolve(&controller, &action)?;

        let addition = &self.config.url.router_addition_params;
        let names = bindable_names(&resolved.meta.params, addition.keys());
        let params = match (self.config.url.kind, params) {
            (UrlType::QueryKeyed | UrlType::PathKeyed, Params::List(values)) => {
                let paired = pair(&values);
                if paired.is_empty() {
                    Params::List(values)
                } else {
                    Params::Map(paired)
                }
            }
            (_, Params::List(values)) if !names.is_empty() => Params::Map(bind(&values, &names)),
            (_, other) => other,
        };
        let params = merge_addition(params, addition);

        let route = RouteDescriptor {
            controller,
            action,
            params,
        };
        tracing::debug!(route = %route, via_fallback = resolved.via_fallback, "Route decoded");
        Ok(Decoded { route, resolved })
    }

    /// Unpack any spec form into (controller, action, params), substituting aliases.
    fn normalize(&self, spec: RouteSpec, args: Params) -> (String, Option<String>, Params) {
        let or_args = |params: Params| if params.is_empty() { args.clone() } else { params };

        match spec {
            RouteSpec::Descriptor(route) => {
                (route.controller, Some(route.action), or_args(route.params))
            }
            RouteSpec::Target(target) => {
                let (controller, action) = split_target(self.aliases.resolve(&target));
                (
                    controller.to_string(),
                    action.map(str::to_string),
                    args.clone(),
                )
            }
            RouteSpec::Parts {
                controller,
                action: Some(action),
                params,
            } => (controller, Some(action), or_args(params)),
            RouteSpec::Parts {
                controller,
                action: None,
                params,
            } => {
                let (controller, action) = split_target(self.aliases.resolve(&controller));
                (
                    controller.to_string(),
                    action.map(str::to_string),
                    or_args(params),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ParamMap;
    use crate::error::RouteError;
    use crate::routing::table::{ActionMeta, Controller, Handler};

    fn table() -> RouteTable {
        let echo = Handler::new(|route| Ok(route.target()));
        RouteTable::new()
            .with(
                Controller::new("Main")
                    .action("index", echo.clone())
                    .action_with("show", ActionMeta::new().params(["id", "lang", "page"]), echo.clone()),
            )
            .with(Controller::new("Pages").fallback(echo))
    }

    fn config(kind: UrlType) -> AppConfig {
        let mut config = AppConfig::default();
        config.url.kind = kind;
        config
    }

    fn decode(config: &AppConfig, spec: impl Into<RouteSpec>, args: Params) -> RouteResult<RouteDescriptor> {
        let aliases = AliasTable::build(&config.router);
        let table = table();
        let decoded = Decoder::new(config, &aliases, &table).decode(spec.into(), args)?;
        Ok(decoded.route)
    }

    #[test]
    fn test_defaults_applied() {
        let config = config(UrlType::QueryPositional);
        let route = decode(&config, "main", Params::Empty).unwrap();
        assert_eq!(route, RouteDescriptor::new("Main", "index", Params::Empty));

        let route = decode(&config, "", Params::Empty).unwrap();
        assert_eq!(route.target(), "Main:index");
    }

    #[test]
    fn test_positional_binding_skips_addition_names() {
        let mut config = config(UrlType::PathPositional);
        config.url.router_addition_params.insert("lang", "en");
        let route = decode(&config, "Main:show", Params::list(["7", "2", "extra"])).unwrap();

        let expected: ParamMap = [("lang", "en"), ("id", "7"), ("page", "2"), ("0", "extra")]
            .into_iter()
            .collect();
        assert_eq!(route.params, Params::Map(expected));
    }

    #[test]
    fn test_keyed_pairing() {
        let config = config(UrlType::PathKeyed);
        let route = decode(&config, "Main:show", Params::list(["1", "2", "3", "4"])).unwrap();
        assert_eq!(route.params, Params::map([("1", "2"), ("3", "4")]));

        let route = decode(&config, "Main:show", Params::list(["solo"])).unwrap();
        assert_eq!(route.params, Params::list(["solo"]));
    }

    #[test]
    fn test_caller_value_wins_over_addition() {
        let mut config = config(UrlType::QueryString);
        config.url.router_addition_params.insert("lang", "en");
        let route = decode(&config, "Main:index", Params::map([("lang", "fr")])).unwrap();
        assert_eq!(route.params, Params::map([("lang", "fr")]));

        let route = decode(&config, "Main:index", Params::Empty).unwrap();
        assert_eq!(route.params, Params::map([("lang", "en")]));

        let raw = Params::Raw("token".into());
        let route = decode(&config, "Main:index", raw.clone()).unwrap();
        assert_eq!(route.params, raw);
    }

    #[test]
    fn test_alias_target_and_parts() {
        let mut config = config(UrlType::QueryPositional);
        config.router.insert("profile".into(), "Main:show".into());

        let route = decode(&config, "profile", Params::list(["9"])).unwrap();
        assert_eq!(route.target(), "Main:show");
        assert_eq!(route.params, Params::map([("id", "9")]));

        let parts = RouteSpec::Parts {
            controller: "profile".into(),
            action: None,
            params: Params::Empty,
        };
        assert_eq!(decode(&config, parts, Params::Empty).unwrap().target(), "Main:show");
    }

    #[test]
    fn test_fallback_and_failures() {
        let config = config(UrlType::QueryPositional);
        assert_eq!(decode(&config, "Pages:about", Params::Empty).unwrap().target(), "Pages:about");
        assert!(matches!(
            decode(&config, "Nope", Params::Empty),
            Err(RouteError::Resolution(ResolutionError::NotFound { .. }))
        ));
        assert!(matches!(
            decode(&config, "Main:missing", Params::Empty),
            Err(RouteError::Resolution(ResolutionError::Unresolvable { .. }))
        ));
    }
}
