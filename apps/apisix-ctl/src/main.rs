mod commands;
mod config;
mod logging;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use apisix_client::ApisixRegistry;
use apisix_sdk::{CallContext, ResourceKind};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use crate::config::CtlConfig;

/// apisix-ctl - manage routes, upstreams, services and SSLs across APISIX clusters
#[derive(Parser)]
#[command(name = "apisix-ctl")]
#[command(about = "Manage APISIX resources across clusters through the admin API")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Give up on admin API calls after this long (e.g. 5s, 500ms)
    #[arg(long, global = true, value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print registered cluster names, default first
    Clusters,
    /// List resources of one kind
    List {
        /// route, upstream, service or ssl
        kind: ResourceKind,
        /// Target cluster (default cluster when omitted)
        #[arg(long)]
        cluster: Option<String>,
    },
    /// Create a resource, or update it when the document carries an id
    Apply {
        kind: ResourceKind,
        /// JSON or YAML document
        #[arg(short, long)]
        file: PathBuf,
        #[arg(long)]
        cluster: Option<String>,
    },
    /// Delete a resource by id
    Delete {
        kind: ResourceKind,
        id: String,
        #[arg(long)]
        cluster: Option<String>,
    },
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = CtlConfig::load(cli.config.as_deref())?;
    logging::init(&config.logging, cli.verbose);

    let registry = ApisixRegistry::from_config(&config.client_config())
        .context("failed to register clusters")?;
    tracing::debug!(clusters = ?registry.cluster_names(), "registry ready");

    let interrupt = CancellationToken::new();
    cancel_on_ctrl_c(interrupt.clone());
    let ctx = CallContext::with_cancellation(interrupt);
    let ctx = match cli.timeout {
        Some(timeout) => ctx.with_timeout(timeout),
        None => ctx,
    };

    match cli.command {
        Commands::Clusters => {
            commands::clusters(&registry);
            Ok(())
        }
        Commands::List { kind, cluster } => {
            commands::list(&registry, &ctx, kind, cluster.as_deref()).await
        }
        Commands::Apply {
            kind,
            file,
            cluster,
        } => commands::apply(&registry, &ctx, kind, &file, cluster.as_deref()).await,
        Commands::Delete { kind, id, cluster } => {
            commands::delete(&registry, &ctx, kind, &id, cluster.as_deref()).await
        }
        Commands::Check => commands::check(&config, &registry),
    }
}

fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("interrupted, cancelling in-flight calls");
                token.cancel();
            }
            Err(e) => tracing::error!(%e, "failed to listen for Ctrl+C"),
        }
    });
}
