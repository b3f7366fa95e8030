//! Hot reload of one app's configuration file into its router.
//!
//! # Responsibilities
//! - Watch the directory holding the config file, so replacing the file by
//!   rename is seen as well as in-place writes
//! - Parse and validate every change; a broken file keeps the current config
//! - Apply accepted configs with `Router::reload`, which invalidates the
//!   app's alias, link-config and controller URI caches
//! - Report every attempt on a channel
//!
//! # Design Decisions
//! - A file equal to the active configuration is not reapplied; the caches
//!   survive saves that change nothing
//! - An empty file is a write in progress, not a request for defaults

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::{parse_config, ConfigError};
use crate::config::schema::UrlType;
use crate::routing::Router;

/// Result of one reload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The router now runs on the new config.
    Applied { url_type: UrlType, link_base: String },
    /// The file matches the active config.
    Unchanged,
    /// The file could not be used; the router keeps its config.
    Rejected(String),
}

/// Keeps a router in sync with its configuration file.
pub struct ConfigWatcher {
    path: PathBuf,
    router: Arc<Router>,
    outcome_tx: mpsc::UnboundedSender<ReloadOutcome>,
}

impl ConfigWatcher {
    /// Returns the watcher and a receiver for reload outcomes.
    pub fn new(
        path: &Path,
        router: Arc<Router>,
    ) -> (Self, mpsc::UnboundedReceiver<ReloadOutcome>) {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        (
            Self {
                path: path.to_path_buf(),
                router,
                outcome_tx,
            },
            outcome_rx,
        )
    }

    /// Read the file once and apply it, without waiting for a change event.
    pub fn reload_now(&self) -> ReloadOutcome {
        let outcome = apply(&self.path, &self.router);
        let _ = self.outcome_tx.send(outcome.clone());
        outcome
    }

    /// Start watching in a background thread; dropping the returned watcher stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name: Option<OsString> = self.path.file_name().map(ToOwned::to_owned);
        let Self {
            path,
            router,
            outcome_tx,
        } = self;
        let watched = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !(event.kind.is_modify() || event.kind.is_create()) {
                        return;
                    }
                    let ours = event
                        .paths
                        .iter()
                        .any(|p| p.file_name() == file_name.as_deref());
                    if ours {
                        tracing::info!(path = %path.display(), app = router.app(), "Config file change detected");
                        let _ = outcome_tx.send(apply(&path, &router));
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = %watched.display(), "Config watcher started");
        Ok(watcher)
    }
}

fn apply(path: &Path, router: &Router) -> ReloadOutcome {
    let loaded = fs::read_to_string(path)
        .map_err(ConfigError::from)
        .and_then(|content| {
            if content.trim().is_empty() {
                return Err(ConfigError::Empty(path.to_path_buf()));
            }
            parse_config(&content)
        });

    match loaded {
        Ok(config) if *router.config() == config => {
            tracing::debug!(app = router.app(), "Config file unchanged, keeping caches");
            ReloadOutcome::Unchanged
        }
        Ok(config) => {
            let url_type = config.url.kind;
            router.reload(config);
            ReloadOutcome::Applied {
                url_type,
                link_base: router.link_base(),
            }
        }
        Err(e) => {
            tracing::error!(app = router.app(), error = %e, "Failed to reload config, keeping current configuration");
            ReloadOutcome::Rejected(e.to_string())
        }
    }
}
