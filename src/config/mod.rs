//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! app config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → owned by the app's Router
//!
//! Cross-app links:
//!     source.rs (ConfigSource) loads the target app's AppConfig
//!
//! On reload:
//!     watcher.rs detects a change to the file
//!     → loader.rs parses, validation.rs validates
//!     → watcher.rs calls Router::reload (config swap + cache invalidation)
//!     → ReloadOutcome on the watcher's channel
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod source;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{ActionConfig, AppConfig, CipherConfig, ControllerConfig, UrlConfig, UrlType};
pub use source::{ConfigSource, FileConfigSource, StaticConfigSource};
pub use watcher::{ConfigWatcher, ReloadOutcome};
