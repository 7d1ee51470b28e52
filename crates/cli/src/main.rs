//! Gateway API coverage CLI
//!
//! This binary builds coverage graphs from a directory of resource documents,
//! either once (`graph`, `summary`) or continuously behind an HTTP server
//! (`serve`).

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gav::render_summary;
use gav_core::config::Config;
use gav_core::{build_graph, CoverageGraph};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gav")]
#[command(about = "Gateway API coverage graph builder and viewer backend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the coverage graph as JSON
    Graph {
        /// Directory of resource documents
        #[arg(short, long, value_name = "DIR")]
        dir: Option<PathBuf>,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Print coverage counters and problem routes
    Summary {
        /// Directory of resource documents
        #[arg(short, long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },
    /// Serve the graph over HTTP and push updates on file changes
    Serve {
        /// Directory of resource documents
        #[arg(short, long, value_name = "DIR")]
        dir: Option<PathBuf>,
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
        /// Do not watch the directory for changes
        #[arg(long)]
        no_watch: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Graph { dir, pretty }) => {
            apply_dir(&mut config, dir);
            let graph = build_from_disk(&config).await?;
            let json = if pretty {
                serde_json::to_string_pretty(&graph)
            } else {
                serde_json::to_string(&graph)
            }
            .context("Failed to serialize graph")?;
            println!("{json}");
            Ok(())
        }
        Some(Commands::Summary { dir }) => {
            apply_dir(&mut config, dir);
            let graph = build_from_disk(&config).await?;
            println!("{}", render_summary(&graph));
            Ok(())
        }
        Some(Commands::Serve {
            dir,
            port,
            no_watch,
        }) => {
            apply_dir(&mut config, dir);
            if let Some(port) = port {
                config.server.port = port;
            }
            if no_watch {
                config.watcher.enabled = false;
            }
            info!(
                "Serving coverage for {} on port {}",
                config.data.dir.display(),
                config.server.port
            );
            gav_server::run_server(config)
                .await
                .context("Coverage server failed")
        }
        None => {
            println!("Run 'gav serve' to start the coverage server, or --help for more options");
            Ok(())
        }
    }
}

/// Initialize logging system
///
/// `RUST_LOG` takes over unless `--verbose` is given. Logs go to stderr so
/// `graph` output on stdout stays valid JSON.
fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let default_filter = format!(
        "gav={level},gav_core={level},gav_loader={level},gav_watcher={level},gav_server={level},tower_http={level}"
    );

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) if !verbose => filter,
        _ => EnvFilter::try_new(default_filter).context("Invalid log filter")?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load(config_path).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    debug!("Loaded configuration: {config:?}");
    Ok(config)
}

fn apply_dir(config: &mut Config, dir: Option<PathBuf>) {
    if let Some(dir) = dir {
        config.data.dir = dir;
    }
}

async fn build_from_disk(config: &Config) -> Result<CoverageGraph> {
    let data = config.data.clone();
    tokio::task::spawn_blocking(move || -> Result<CoverageGraph> {
        let resources = gav_loader::load_dir(&data)
            .with_context(|| format!("Failed to load {}", data.dir.display()))?;
        build_graph(&resources).context("Failed to build coverage graph")
    })
    .await
    .context("Graph build task failed")?
}
