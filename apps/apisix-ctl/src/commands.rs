//! Subcommand implementations. Results are written to stdout as JSON.

use std::path::Path;

use anyhow::{Context, Result};
use apisix_client::ApisixRegistry;
use apisix_sdk::{
    ApisixClient, CallContext, Cluster, Resource, ResourceKind, Route, Service, Ssl, Upstream,
};
use serde::Serialize;

use crate::config::CtlConfig;

/// Runs `$op::<T>(args...)` with `T` chosen by a [`ResourceKind`].
macro_rules! for_kind {
    ($kind:expr, $op:ident($($arg:expr),* $(,)?)) => {
        match $kind {
            ResourceKind::Route => $op::<Route>($($arg),*).await,
            ResourceKind::Upstream => $op::<Upstream>($($arg),*).await,
            ResourceKind::Service => $op::<Service>($($arg),*).await,
            ResourceKind::Ssl => $op::<Ssl>($($arg),*).await,
        }
    };
}

fn resolve(registry: &ApisixRegistry, cluster: Option<&str>) -> std::sync::Arc<dyn Cluster> {
    registry.cluster(cluster.unwrap_or_else(|| registry.default_cluster_name()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn clusters(registry: &ApisixRegistry) {
    for name in registry.cluster_names() {
        println!("{name}");
    }
}

pub fn check(config: &CtlConfig, registry: &ApisixRegistry) -> Result<()> {
    tracing::info!(clusters = registry.len(), "configuration checked");
    println!("Configuration is valid");
    print_json(config)
}

pub async fn list(
    registry: &ApisixRegistry,
    ctx: &CallContext,
    kind: ResourceKind,
    cluster: Option<&str>,
) -> Result<()> {
    let cluster = resolve(registry, cluster);
    for_kind!(kind, list_kind(&*cluster, ctx))
}

async fn list_kind<T: Resource>(cluster: &dyn Cluster, ctx: &CallContext) -> Result<()> {
    let items = T::handler(cluster).list(ctx).await?;
    print_json(&items)
}

pub async fn apply(
    registry: &ApisixRegistry,
    ctx: &CallContext,
    kind: ResourceKind,
    file: &Path,
    cluster: Option<&str>,
) -> Result<()> {
    let document = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let cluster = resolve(registry, cluster);
    for_kind!(kind, apply_kind(&*cluster, ctx, &document))
}

async fn apply_kind<T: Resource>(
    cluster: &dyn Cluster,
    ctx: &CallContext,
    document: &str,
) -> Result<()> {
    let resource: T = serde_saphyr::from_str(document)
        .with_context(|| format!("document is not a valid {}", T::KIND))?;
    let handler = T::handler(cluster);

    let stored = if resource.id().is_some() {
        handler.update(ctx, &resource).await?
    } else {
        handler.create(ctx, &resource).await?
    };
    print_json(&stored)
}

pub async fn delete(
    registry: &ApisixRegistry,
    ctx: &CallContext,
    kind: ResourceKind,
    id: &str,
    cluster: Option<&str>,
) -> Result<()> {
    let cluster = resolve(registry, cluster);
    for_kind!(kind, delete_kind(&*cluster, ctx, id))
}

async fn delete_kind<T: Resource>(cluster: &dyn Cluster, ctx: &CallContext, id: &str) -> Result<()> {
    let mut resource: T = serde_json::from_value(serde_json::json!({}))
        .with_context(|| format!("{} cannot be addressed by id alone", T::KIND))?;
    resource.set_id(id.to_owned());

    T::handler(cluster).delete(ctx, &resource).await?;
    println!("deleted {} {id}", T::KIND);
    Ok(())
}
