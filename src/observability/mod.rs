//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Router, caches, dispatcher produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters via `metrics`)
//!
//! Consumers:
//!     → Log output configured by the host (the CLI installs a fmt subscriber)
//!     → Any `metrics` recorder the host installs
//! ```
//!
//! # Design Decisions
//! - The library never installs a global subscriber or recorder
//! - Metrics are cheap (no recorder means no-op)

pub mod logging;
pub mod metrics;
