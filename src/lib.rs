//! Bidirectional route codec.
//!
//! Decodes inbound routes and URLs into resolved `RouteDescriptor`s and
//! generates canonical, optionally encrypted links for the same descriptors
//! across five URL grammars.

pub mod cache;
pub mod codec;
pub mod config;
pub mod error;
pub mod observability;
pub mod routing;

pub use codec::{ParamMap, Params, Scalar};
pub use config::schema::{AppConfig, UrlType};
pub use error::{RouteError, RouteResult};
pub use routing::{Dispatcher, Link, RouteDescriptor, RouteSpec, RouteTable, Router};
