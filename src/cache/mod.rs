//! Caching subsystem.
//!
//! - store.rs: link-generation memo tables (url config, controller URI, alias table)
//! - response.rs: response cache interface used by the dispatcher

pub mod response;
pub mod store;

pub use response::{MemoryResponseCache, ResponseCache};
pub use store::{LinkConfig, RouteCaches};
