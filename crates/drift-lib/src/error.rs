//! Errors raised while acquiring a namespace snapshot

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Fatal failure to observe one side of the comparison
///
/// Any of these aborts the run; a partially collected snapshot is never compared.
#[derive(Debug, Error)]
pub enum CollectionError {
    /// Kubeconfig could not be read or resolved
    #[error("cluster {cluster}: invalid kubeconfig {}: {source}", path.display())]
    Kubeconfig {
        cluster: String,
        path: PathBuf,
        #[source]
        source: kube::config::KubeconfigError,
    },

    /// API client could not be constructed
    #[error("cluster {cluster}: failed to create client: {source}")]
    Client {
        cluster: String,
        #[source]
        source: kube::Error,
    },

    /// Target namespace does not exist
    #[error("cluster {cluster}: namespace '{namespace}' not found")]
    NamespaceNotFound { cluster: String, namespace: String },

    /// A list or get call failed
    #[error("cluster {cluster}: failed to list {kind}: {source}")]
    Api {
        cluster: String,
        kind: &'static str,
        #[source]
        source: kube::Error,
    },

    /// Collection did not finish before the deadline
    #[error("cluster {cluster}: collection timed out after {}s", timeout.as_secs())]
    Timeout { cluster: String, timeout: Duration },

    /// Returned objects do not belong to the requested namespace
    #[error("cluster {cluster}: {kind} '{name}' is inconsistent: {reason}")]
    Inconsistent {
        cluster: String,
        kind: &'static str,
        name: String,
        reason: String,
    },
}

impl CollectionError {
    /// Label of the cluster the failure happened on
    pub fn cluster(&self) -> &str {
        match self {
            Self::Kubeconfig { cluster, .. }
            | Self::Client { cluster, .. }
            | Self::NamespaceNotFound { cluster, .. }
            | Self::Api { cluster, .. }
            | Self::Timeout { cluster, .. }
            | Self::Inconsistent { cluster, .. } => cluster,
        }
    }
}
