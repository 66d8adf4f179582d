#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Registry behaviour with an in-memory cluster factory.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use apisix_client::{ApisixClientConfig, ApisixRegistry, ClusterFactory};
use apisix_sdk::{
    ApisixClient, ApisixError, CallContext, Cluster, ClusterOptions, Resource, ResourceClient,
    Route, RouteClient, Service, ServiceClient, Ssl, SslClient, Upstream, UpstreamClient,
};
use async_trait::async_trait;

/// Resource handler that answers every call successfully without a server.
struct EchoResource;

#[async_trait]
impl<T: Resource> ResourceClient<T> for EchoResource {
    async fn list(&self, ctx: &CallContext) -> Result<Vec<T>, ApisixError> {
        ctx.check()?;
        Ok(Vec::new())
    }

    async fn create(&self, ctx: &CallContext, resource: &T) -> Result<T, ApisixError> {
        ctx.check()?;
        Ok(resource.clone())
    }

    async fn update(&self, ctx: &CallContext, resource: &T) -> Result<T, ApisixError> {
        ctx.check()?;
        Ok(resource.clone())
    }

    async fn delete(&self, ctx: &CallContext, _resource: &T) -> Result<(), ApisixError> {
        ctx.check()
    }
}

struct FakeCluster {
    name: String,
}

impl Cluster for FakeCluster {
    fn name(&self) -> &str {
        &self.name
    }
    fn route(&self) -> Arc<RouteClient> {
        Arc::new(EchoResource)
    }
    fn upstream(&self) -> Arc<UpstreamClient> {
        Arc::new(EchoResource)
    }
    fn service(&self) -> Arc<ServiceClient> {
        Arc::new(EchoResource)
    }
    fn ssl(&self) -> Arc<SslClient> {
        Arc::new(EchoResource)
    }
}

/// Counts builds and fails for options whose base URL is `"bad"`.
#[derive(Default)]
struct FakeFactory {
    builds: AtomicUsize,
}

impl ClusterFactory for FakeFactory {
    fn build(&self, options: &ClusterOptions) -> Result<Arc<dyn Cluster>, ApisixError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        if options.base_url == "bad" {
            return Err(ApisixError::InvalidClusterOptions {
                name: options.name.clone(),
                reason: "unreachable".to_owned(),
            });
        }
        Ok(Arc::new(FakeCluster {
            name: options.name.clone(),
        }))
    }
}

fn options(name: &str) -> ClusterOptions {
    ClusterOptions::new(name, format!("http://{name}"))
}

fn registry() -> (ApisixRegistry, Arc<FakeFactory>) {
    let factory = Arc::new(FakeFactory::default());
    let registry = ApisixRegistry::with_factory(&options("default"), factory.clone()).unwrap();
    (registry, factory)
}

fn assert_duplicate(result: Result<(), ApisixError>, expected: &str) {
    match result {
        Err(ApisixError::DuplicatedCluster { name }) => assert_eq!(name, expected),
        other => panic!("expected duplicate cluster error, got {other:?}"),
    }
}

#[tokio::test]
async fn walkthrough_from_default_to_missing_cluster() {
    let (registry, _) = registry();

    registry.add_cluster(&options("prod")).unwrap();
    assert_duplicate(registry.add_cluster(&options("prod")), "prod");

    let names: Vec<String> = registry
        .list_clusters()
        .iter()
        .map(|c| c.name().to_owned())
        .collect();
    assert_eq!(names, ["default", "prod"]);

    let err = registry
        .cluster("staging")
        .route()
        .list(&CallContext::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ApisixError::ClusterNotFound));
}

#[test]
fn construction_failure_produces_no_registry() {
    let factory = Arc::new(FakeFactory::default());
    let result = ApisixRegistry::with_factory(&ClusterOptions::new("default", "bad"), factory);
    assert!(matches!(
        result,
        Err(ApisixError::InvalidClusterOptions { .. })
    ));
}

#[test]
fn default_cluster_is_never_the_stand_in() {
    let (registry, _) = registry();
    let resolved = registry.cluster("default");
    assert_eq!(resolved.name(), "default");
    assert!(Arc::ptr_eq(&resolved, &registry.cluster("default")));
    assert!(!Arc::ptr_eq(&resolved, &registry.cluster("unknown")));
}

#[tokio::test]
async fn every_operation_on_an_unknown_name_is_cluster_not_found() {
    let (registry, _) = registry();
    let ghost = registry.cluster("ghost");
    let ctx = CallContext::new();

    let results = [
        ghost.route().list(&ctx).await.map(|_| ()),
        ghost.route().create(&ctx, &Route::default()).await.map(|_| ()),
        ghost.upstream().update(&ctx, &Upstream::default()).await.map(|_| ()),
        ghost.service().delete(&ctx, &Service::default()).await,
        ghost.ssl().list(&ctx).await.map(|_| ()),
    ];
    for result in results {
        assert!(matches!(result, Err(ApisixError::ClusterNotFound)));
    }

    // Lookups never register anything.
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.list_clusters().len(), 1);
}

#[test]
fn duplicate_of_default_is_rejected_before_the_factory_runs() {
    let (registry, factory) = registry();

    assert_duplicate(registry.add_cluster(&options("default")), "default");
    assert_eq!(factory.builds.load(Ordering::SeqCst), 1);
    assert_eq!(registry.list_clusters().len(), 1);
}

#[test]
fn duplicate_name_keeps_the_existing_entry() {
    let (registry, _) = registry();
    registry.add_cluster(&options("prod")).unwrap();
    let before = registry.cluster("prod");

    let replacement = ClusterOptions::new("prod", "http://elsewhere");
    assert_duplicate(registry.add_cluster(&replacement), "prod");

    let after = registry.cluster("prod");
    assert!(Arc::ptr_eq(&before, &after));
}

#[test]
fn failed_add_leaves_state_unchanged() {
    let (registry, _) = registry();

    let err = registry
        .add_cluster(&ClusterOptions::new("flaky", "bad"))
        .unwrap_err();
    assert!(matches!(err, ApisixError::InvalidClusterOptions { .. }));
    assert!(!registry.contains("flaky"));
    assert_eq!(registry.cluster_names(), ["default"]);

    registry.add_cluster(&options("flaky")).unwrap();
    assert!(registry.contains("flaky"));
}

#[test]
fn added_cluster_resolves_idempotently() {
    let (registry, _) = registry();
    registry.add_cluster(&options("edge")).unwrap();

    let first = registry.cluster("edge");
    for _ in 0..3 {
        assert!(Arc::ptr_eq(&first, &registry.cluster("edge")));
    }
    assert_eq!(first.name(), "edge");
}

#[test]
fn list_clusters_has_default_first_and_no_duplicates() {
    let (registry, _) = registry();
    for name in ["c", "a", "b"] {
        registry.add_cluster(&options(name)).unwrap();
    }
    assert!(registry.add_cluster(&options("a")).is_err());

    let clusters = registry.list_clusters();
    assert_eq!(clusters.len(), 1 + 3);
    assert_eq!(clusters[0].name(), "default");

    let unique: HashSet<&str> = clusters.iter().map(|c| c.name()).collect();
    assert_eq!(unique.len(), clusters.len());
    assert!(!unique.contains(""));
}

#[test]
fn concurrent_adds_with_distinct_names_all_succeed() {
    const THREADS: usize = 16;
    let (registry, _) = registry();
    let barrier = Barrier::new(THREADS);

    thread::scope(|s| {
        for i in 0..THREADS {
            let registry = &registry;
            let barrier = &barrier;
            s.spawn(move || {
                barrier.wait();
                registry.add_cluster(&options(&format!("c{i}"))).unwrap();
            });
        }
    });

    assert_eq!(registry.len(), THREADS + 1);
    for i in 0..THREADS {
        assert_eq!(registry.cluster(&format!("c{i}")).name(), format!("c{i}"));
    }
}

#[test]
fn concurrent_adds_with_the_same_name_admit_exactly_one() {
    const THREADS: usize = 16;
    let (registry, _) = registry();
    let barrier = Barrier::new(THREADS);
    let successes = AtomicUsize::new(0);
    let duplicates = AtomicUsize::new(0);

    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                barrier.wait();
                match registry.add_cluster(&options("shared")) {
                    Ok(()) => successes.fetch_add(1, Ordering::SeqCst),
                    Err(ApisixError::DuplicatedCluster { .. }) => {
                        duplicates.fetch_add(1, Ordering::SeqCst)
                    }
                    Err(other) => panic!("unexpected error: {other}"),
                };
            });
        }
    });

    assert_eq!(successes.load(Ordering::SeqCst), 1);
    assert_eq!(duplicates.load(Ordering::SeqCst), THREADS - 1);
    assert_eq!(registry.len(), 2);
}

#[test]
fn reads_run_alongside_writes() {
    let (registry, _) = registry();
    let barrier = Barrier::new(2);

    thread::scope(|s| {
        s.spawn(|| {
            barrier.wait();
            for i in 0..200 {
                registry.add_cluster(&options(&format!("w{i}"))).unwrap();
            }
        });
        s.spawn(|| {
            barrier.wait();
            for _ in 0..200 {
                let clusters = registry.list_clusters();
                assert_eq!(clusters[0].name(), "default");
                let _ = registry.cluster("w100");
            }
        });
    });

    assert_eq!(registry.len(), 201);
}

#[test]
fn removal_keeps_default_and_frees_the_name() {
    let (registry, _) = registry();
    registry.add_cluster(&options("temp")).unwrap();
    let handle = registry.cluster("temp");

    assert!(matches!(
        registry.remove_cluster("default"),
        Err(ApisixError::DefaultClusterRemoval { .. })
    ));
    assert!(matches!(
        registry.remove_cluster("nope"),
        Err(ApisixError::UnknownCluster { .. })
    ));

    let removed = registry.remove_cluster("temp").unwrap();
    assert!(Arc::ptr_eq(&removed, &handle));
    assert!(registry.try_cluster("temp").is_none());
    assert_eq!(handle.name(), "temp");

    registry.add_cluster(&options("temp")).unwrap();
    assert!(!Arc::ptr_eq(&registry.cluster("temp"), &handle));
}

#[tokio::test]
async fn cancelled_context_reaches_the_cluster_handler() {
    let (registry, _) = registry();
    let ctx = CallContext::new();
    ctx.cancel();

    let err = registry
        .cluster("default")
        .ssl()
        .create(&ctx, &Ssl::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ApisixError::Cancelled));
}

#[test]
fn config_registers_every_cluster_in_order() {
    let config = ApisixClientConfig {
        default_cluster: options("main"),
        clusters: vec![options("b"), options("a")],
    };
    let registry =
        ApisixRegistry::from_config_with_factory(&config, Arc::new(FakeFactory::default()))
            .unwrap();

    assert_eq!(registry.default_cluster_name(), "main");
    assert_eq!(registry.cluster_names(), ["main", "a", "b"]);
}

#[test]
fn config_with_repeated_names_fails() {
    let config = ApisixClientConfig {
        default_cluster: options("main"),
        clusters: vec![options("x"), options("x")],
    };
    let result =
        ApisixRegistry::from_config_with_factory(&config, Arc::new(FakeFactory::default()));
    assert!(matches!(
        result,
        Err(ApisixError::DuplicatedCluster { .. })
    ));
}
