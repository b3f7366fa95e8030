//! Lookup of other apps' configuration for cross-app links.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::AppConfig;

/// Read-only access to per-app configuration.
pub trait ConfigSource: Send + Sync {
    /// Load the configuration for `app`.
    fn load(&self, app: &str) -> Result<AppConfig, ConfigError>;
}

/// Reads `<root>/<app>/app.toml`.
#[derive(Debug, Clone)]
pub struct FileConfigSource {
    root: PathBuf,
}

impl FileConfigSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the configuration file for `app`.
    pub fn path_for(&self, app: &str) -> PathBuf {
        self.root.join(app).join("app.toml")
    }
}

impl ConfigSource for FileConfigSource {
    fn load(&self, app: &str) -> Result<AppConfig, ConfigError> {
        let path = self.path_for(app);
        if !path.is_file() {
            return Err(ConfigError::UnknownApp(app.to_string()));
        }
        load_config(&path)
    }
}

/// In-memory configurations, keyed by app name.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigSource {
    apps: HashMap<String, AppConfig>,
}

impl StaticConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_app(mut self, app: impl Into<String>, config: AppConfig) -> Self {
        self.apps.insert(app.into(), config);
        self
    }
}

impl ConfigSource for StaticConfigSource {
    fn load(&self, app: &str) -> Result<AppConfig, ConfigError> {
        self.apps
            .get(app)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownApp(app.to_string()))
    }
}
