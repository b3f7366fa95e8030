//! Registered handler table: controller name → actions and optional fallback.
//!
//! # Responsibilities
//! - Hold handlers and per-action metadata, populated at startup
//! - Resolve a (controller, action) pair, including the fallback handler,
//!   in a single call
//! - Supply the ordered parameter names both encoder and decoder bind with
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc without locks)
//! - Resolution failures are explicit `ResolutionError`s

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::schema::ControllerConfig;
use crate::error::{ResolutionError, RouteResult};
use crate::routing::descriptor::RouteDescriptor;

type HandlerFn = dyn Fn(&RouteDescriptor) -> RouteResult<String> + Send + Sync;

/// A callable action handler.
#[derive(Clone)]
pub struct Handler(Arc<HandlerFn>);

impl Handler {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&RouteDescriptor) -> RouteResult<String> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, route: &RouteDescriptor) -> RouteResult<String> {
        (self.0)(route)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler")
    }
}

/// Declarative metadata for one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionMeta {
    /// Ordered names positional values are bound to.
    pub params: Vec<String>,
    pub public: bool,
    pub is_abstract: bool,
    /// Response cache lifetime for the dispatcher.
    pub cache_ttl: Option<Duration>,
}

impl Default for ActionMeta {
    fn default() -> Self {
        Self {
            params: Vec::new(),
            public: true,
            is_abstract: false,
            cache_ttl: None,
        }
    }
}

impl ActionMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn params<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }

    pub fn abstract_action(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn cache_for(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }
}

static FALLBACK_META: ActionMeta = ActionMeta {
    params: Vec::new(),
    public: true,
    is_abstract: false,
    cache_ttl: None,
};

#[derive(Debug, Clone)]
struct Action {
    meta: ActionMeta,
    handler: Handler,
}

/// A controller and its actions.
#[derive(Debug, Clone)]
pub struct Controller {
    name: String,
    is_abstract: bool,
    actions: HashMap<String, Action>,
    fallback: Option<Handler>,
}

impl Controller {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_abstract: false,
            actions: HashMap::new(),
            fallback: None,
        }
    }

    /// Mark the controller as never dispatchable.
    pub fn abstract_controller(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Register a public action without parameter names.
    pub fn action(self, name: impl Into<String>, handler: Handler) -> Self {
        self.action_with(name, ActionMeta::default(), handler)
    }

    pub fn action_with(mut self, name: impl Into<String>, meta: ActionMeta, handler: Handler) -> Self {
        self.actions.insert(name.into(), Action { meta, handler });
        self
    }

    /// Handler for actions that are not registered.
    pub fn fallback(mut self, handler: Handler) -> Self {
        self.fallback = Some(handler);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Outcome of resolving a controller/action pair.
#[derive(Debug, Clone)]
pub struct Resolved<'a> {
    pub meta: &'a ActionMeta,
    pub handler: &'a Handler,
    /// True when the action was not registered and the fallback answered.
    pub via_fallback: bool,
}

/// All controllers of an app.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    controllers: HashMap<String, Controller>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a controller.
    pub fn register(&mut self, controller: Controller) -> &mut Self {
        self.controllers.insert(controller.name.clone(), controller);
        self
    }

    pub fn with(mut self, controller: Controller) -> Self {
        self.register(controller);
        self
    }

    /// Build from declarative config, routing every action to `handler`.
    pub fn from_config(controllers: &BTreeMap<String, ControllerConfig>, handler: Handler) -> Self {
        let mut table = RouteTable::new();
        for (name, config) in controllers {
            let mut controller = Controller::new(name.clone());
            controller.is_abstract = config.is_abstract;
            if config.fallback {
                controller.fallback = Some(handler.clone());
            }
            for (action, action_config) in &config.actions {
                let meta = ActionMeta {
                    params: action_config.params.clone(),
                    public: action_config.public,
                    is_abstract: action_config.is_abstract,
                    cache_ttl: action_config
                        .cache_ttl_secs
                        .filter(|secs| *secs > 0)
                        .map(Duration::from_secs),
                };
                controller = controller.action_with(action.clone(), meta, handler.clone());
            }
            table.register(controller);
        }
        table
    }

    /// Resolve `controller:action` to its handler.
    pub fn resolve(&self, controller: &str, action: &str) -> Result<Resolved<'_>, ResolutionError> {
        let entry = self
            .controllers
            .get(controller)
            .ok_or_else(|| ResolutionError::NotFound {
                controller: controller.to_string(),
            })?;

        if entry.is_abstract {
            return Err(ResolutionError::Forbidden {
                target: controller.to_string(),
            });
        }

        match entry.actions.get(action) {
            Some(found) if found.meta.public && !found.meta.is_abstract => Ok(Resolved {
                meta: &found.meta,
                handler: &found.handler,
                via_fallback: false,
            }),
            Some(_) => Err(ResolutionError::Forbidden {
                target: format!("{controller}:{action}"),
            }),
            None => match &entry.fallback {
                Some(handler) => Ok(Resolved {
                    meta: &FALLBACK_META,
                    handler,
                    via_fallback: true,
                }),
                None => Err(ResolutionError::Unresolvable {
                    controller: controller.to_string(),
                    action: action.to_string(),
                }),
            },
        }
    }

    /// Parameter names declared for an action; empty when unknown.
    pub fn param_names(&self, controller: &str, action: &str) -> &[String] {
        self.controllers
            .get(controller)
            .and_then(|c| c.actions.get(action))
            .map(|a| a.meta.params.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, controller: &str) -> bool {
        self.controllers.contains_key(controller)
    }
}
