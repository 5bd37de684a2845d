//! Structured logging for drift runs
//!
//! Every event carries an `event` field and the namespace under comparison,
//! so JSON logs from many runs can be filtered and joined.

use crate::error::CollectionError;
use crate::models::Snapshot;
use crate::report::DiffReport;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Structured logger for collection and comparison events
#[derive(Clone)]
pub struct DriftLogger {
    namespace: String,
}

impl DriftLogger {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// Log the start of a cluster fetch
    pub fn collection_started(&self, cluster: &str) {
        debug!(
            event = "collection_started",
            namespace = %self.namespace,
            cluster = %cluster,
            "Collecting namespace resources"
        );
    }

    /// Log a successfully built snapshot
    pub fn collection_finished(&self, cluster: &str, snapshot: &Snapshot, elapsed: Duration) {
        info!(
            event = "collection_finished",
            namespace = %self.namespace,
            cluster = %cluster,
            elapsed_ms = elapsed.as_millis() as u64,
            pods = snapshot.pod_count,
            deployments = snapshot.deployments.len(),
            autoscalers = snapshot.horizontal_autoscalers.len(),
            services = snapshot.services.len(),
            config_maps = snapshot.config_maps.len(),
            ingress_rules = snapshot.ingress_rules.len(),
            credential_secret = snapshot.has_credential_secret,
            "Namespace snapshot collected"
        );
    }

    /// Log a fatal collection failure
    pub fn collection_failed(&self, cluster: &str, err: &CollectionError) {
        error!(
            event = "collection_failed",
            namespace = %self.namespace,
            cluster = %cluster,
            error = %err,
            "Namespace snapshot collection failed"
        );
    }

    /// Log the outcome of a comparison
    pub fn comparison_finished(&self, first: &str, second: &str, report: &DiffReport) {
        if report.identical {
            info!(
                event = "comparison_finished",
                namespace = %self.namespace,
                first = %first,
                second = %second,
                identical = true,
                "Namespaces are identical"
            );
            return;
        }

        let categories: Vec<String> = report
            .summary()
            .iter()
            .map(|(c, n)| format!("{c}={n}"))
            .collect();
        warn!(
            event = "comparison_finished",
            namespace = %self.namespace,
            first = %first,
            second = %second,
            identical = false,
            differences = report.differences.len(),
            categories = %categories.join(","),
            "Configuration drift detected"
        );
    }
}
