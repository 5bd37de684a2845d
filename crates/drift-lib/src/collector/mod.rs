//! Resource collection from Kubernetes clusters
//!
//! A [`ResourceCollector`] fetches the raw objects of one namespace; the
//! functions here turn that into a finished [`Snapshot`] per cluster, both
//! clusters concurrently, failing the whole run on the first collection error.

mod kubernetes;


pub use kubernetes::KubeCollector;

use crate::builder::{build, RawResources, DEFAULT_CREDENTIAL_SECRET};
use crate::error::CollectionError;
use crate::models::Snapshot;
use crate::observability::DriftLogger;
use std::time::{Duration, Instant};

pub use async_trait::async_trait;

/// Default per-cluster collection deadline
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Trait for fetching a namespace's raw resources from one cluster
#[async_trait]
pub trait ResourceCollector: Send + Sync {
    /// Label used in logs and errors
    fn cluster(&self) -> &str;

    /// Fetch every resource kind the snapshot needs
    async fn collect(&self, namespace: &str) -> Result<RawResources, CollectionError>;
}

/// Options shared by both sides of a comparison
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Secret whose presence is recorded
    pub credential_secret: String,
    /// Deadline per cluster; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            credential_secret: DEFAULT_CREDENTIAL_SECRET.to_string(),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

/// Collect and build the snapshot of `namespace` on one cluster
///
/// Errors are never retried.
pub async fn collect_snapshot(
    collector: &dyn ResourceCollector,
    namespace: &str,
    options: &CollectOptions,
) -> Result<Snapshot, CollectionError> {
    let logger = DriftLogger::new(namespace);
    let cluster = collector.cluster();
    let started = Instant::now();
    logger.collection_started(cluster);

    let result = fetch(collector, namespace, options.timeout)
        .await
        .and_then(|raw| build(namespace, raw, &options.credential_secret));

    match &result {
        Ok(snapshot) => logger.collection_finished(cluster, snapshot, started.elapsed()),
        Err(e) => logger.collection_failed(cluster, e),
    }
    result
}

async fn fetch(
    collector: &dyn ResourceCollector,
    namespace: &str,
    timeout: Option<Duration>,
) -> Result<RawResources, CollectionError> {
    let Some(timeout) = timeout else {
        return collector.collect(namespace).await;
    };

    tokio::time::timeout(timeout, collector.collect(namespace))
        .await
        .map_err(|_| CollectionError::Timeout {
            cluster: collector.cluster().to_string(),
            timeout,
        })?
}

/// Build both snapshots concurrently
///
/// Both collections run to completion; if either failed, the first cluster's
/// error takes precedence.
pub async fn collect_pair(
    first: &dyn ResourceCollector,
    second: &dyn ResourceCollector,
    namespace: &str,
    options: &CollectOptions,
) -> Result<(Snapshot, Snapshot), CollectionError> {
    let (a, b) = tokio::join!(
        collect_snapshot(first, namespace, options),
        collect_snapshot(second, namespace, options),
    );
    Ok((a?, b?))
}
