//! Normalized snapshot of a namespace's workload configuration

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Point-in-time record of one namespace on one cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub pod_count: usize,
    /// In the order the API returned them
    pub deployments: Vec<Deployment>,
    pub horizontal_autoscalers: Vec<Autoscaler>,
    pub services: Vec<Service>,
    pub config_maps: Vec<ConfigMap>,
    pub ingress_rules: Vec<IngressRule>,
    pub has_credential_secret: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub replicas: i32,
    /// Pod template container order; part of the deployment's identity
    pub containers: Vec<ContainerResources>,
}

/// Requests and limits as literal quantity strings ("100m", "1Gi")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerResources {
    pub request_cpu: String,
    pub request_memory: String,
    pub limit_cpu: String,
    pub limit_memory: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Autoscaler {
    pub min_replicas: i32,
    pub max_replicas: i32,
    pub target_cpu_utilization_percent: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub ports: BTreeSet<PortBinding>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PortBinding {
    pub name: String,
    pub port: i32,
    pub protocol: String,
    pub target_port: String,
}

impl std::fmt::Display for PortBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = if self.name.is_empty() { "-" } else { &self.name };
        write!(
            f,
            "{}:{}/{}->{}",
            name, self.port, self.protocol, self.target_port
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigMap {
    pub name: String,
    pub data: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressRule {
    pub service_name: String,
    pub service_port: String,
}

impl std::fmt::Display for IngressRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.service_name, self.service_port)
    }
}
