//! route-codec command line.
//!
//! ```text
//! route-codec --config app.toml encode Main:show 7 2 --encrypt
//! route-codec --config app.toml decode '/?/Main/show/7/2'
//! route-codec --config app.toml dispatch Main:show 7
//! route-codec --config app.toml watch
//! ```
//!
//! Handlers are built from the `[controllers]` table of the config; each one
//! echoes its decoded route as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use route_codec::cache::MemoryResponseCache;
use route_codec::config::{load_config, AppConfig, ConfigWatcher, FileConfigSource, ReloadOutcome};
use route_codec::observability::logging::init_logging;
use route_codec::routing::{Dispatcher, Handler, Link, RouteTable, Router};
use route_codec::{ParamMap, Params, RouteError};

#[derive(Parser)]
#[command(name = "route-codec")]
#[command(about = "Encode and decode application routes", long_about = None)]
struct Cli {
    /// App configuration file (TOML); built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Name of the current app
    #[arg(short, long, default_value = "web")]
    app: String,

    /// Directory holding `<app>/app.toml` files for cross-app links
    #[arg(long)]
    apps_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a link
    Encode {
        /// Alias, Controller or Controller:action
        controller: String,
        /// Positional parameter values
        params: Vec<String>,
        /// Encrypt the parameter segment
        #[arg(long)]
        encrypt: bool,
        /// Named parameter (repeatable)
        #[arg(long = "named", value_parser = parse_named)]
        named: Vec<(String, String)>,
        /// Link into another app (requires --apps-root)
        #[arg(long)]
        target_app: Option<String>,
    },
    /// Decode a URL into its route descriptor
    Decode {
        url: String,
        /// The parameter segment is a cipher token
        #[arg(long)]
        encrypted: bool,
    },
    /// Decode a route and run its handler
    Dispatch {
        controller: String,
        params: Vec<String>,
    },
    /// Watch the config file and reload on change
    Watch,
}

fn parse_named(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))
}

fn echo_handler() -> Handler {
    Handler::new(|route| {
        serde_json::to_string_pretty(route).map_err(|e| RouteError::Handler(e.to_string()))
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging("route_codec=info");
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    tracing::info!(app = %cli.app, url_type = %config.url.kind, "Configuration loaded");

    let table = RouteTable::from_config(&config.controllers, echo_handler());
    let mut router = Router::new(cli.app.clone(), config, table);
    if let Some(root) = &cli.apps_root {
        router = router.with_source(Arc::new(FileConfigSource::new(root)));
    }
    let router = Arc::new(router);

    match cli.command {
        Commands::Encode {
            controller,
            params,
            encrypt,
            named,
            target_app,
        } => {
            let params = if named.is_empty() {
                Params::list(params)
            } else {
                let mut map: ParamMap = named.into_iter().collect();
                for value in params {
                    map.push(value);
                }
                Params::Map(map)
            };
            let mut link = Link::to(controller).params(params).encrypted(encrypt);
            link.app = target_app;
            println!("{}", router.encode(&link)?);
        }
        Commands::Decode { url, encrypted } => {
            let decoded = router.decode_url(&url, encrypted)?;
            println!("{}", serde_json::to_string_pretty(&decoded.route)?);
        }
        Commands::Dispatch { controller, params } => {
            let dispatcher = Dispatcher::new(Arc::clone(&router))
                .with_cache(Arc::new(MemoryResponseCache::new()));
            println!("{}", dispatcher.dispatch(controller, Params::list(params))?);
        }
        Commands::Watch => {
            let Some(path) = cli.config else {
                return Err("watch requires --config".into());
            };
            let (watcher, mut outcomes) = ConfigWatcher::new(&path, Arc::clone(&router));
            let _watcher = watcher.run()?;

            loop {
                tokio::select! {
                    Some(outcome) = outcomes.recv() => match outcome {
                        ReloadOutcome::Applied { url_type, link_base } => {
                            println!("reloaded, url type {url_type}, link base {link_base}");
                        }
                        ReloadOutcome::Unchanged => {}
                        ReloadOutcome::Rejected(reason) => eprintln!("reload rejected: {reason}"),
                    },
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Shutdown signal received");
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}
