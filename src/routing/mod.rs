//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound:
//!     URL → parser.rs (strip base / index / ext, split on dot, decrypt)
//!         → RouteSpec::Parts
//!     RouteSpec + args → decoder.rs (aliases, defaults, table.rs resolve,
//!         bind names, merge addition params)
//!         → RouteDescriptor + handler → dispatch.rs (response cache) → body
//!
//! Outbound:
//!     Link → encoder.rs (alias.rs, cached controller URI, param grammar,
//!         cipher) → URL string
//!
//! Per app (router.rs):
//!     AppConfig (ArcSwap) + RouteTable + RouteCaches + ConfigSource
//! ```
//!
//! # Design Decisions
//! - Handlers and parameter names are registered up front, never discovered
//! - Encoder and decoder read parameter names from the same `RouteTable`
//! - Caches are owned by the router context, not global

pub mod alias;
pub mod decoder;
pub mod descriptor;
pub mod dispatch;
pub mod encoder;
pub mod parser;
pub mod router;
pub mod table;

pub use alias::AliasTable;
pub use decoder::{Decoded, Decoder};
pub use descriptor::{RouteDescriptor, RouteSpec, DEFAULT_ACTION};
pub use dispatch::{cache_key, Dispatcher};
pub use encoder::{Encoder, Link};
pub use parser::UrlParser;
pub use router::Router;
pub use table::{ActionMeta, Controller, Handler, Resolved, RouteTable};
