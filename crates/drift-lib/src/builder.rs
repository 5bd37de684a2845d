//! Snapshot construction from raw Kubernetes objects
//!
//! Maps the API's object shapes onto the [`Snapshot`] model. Ordered fields keep
//! the collector's return order; ports and config map data become sets/maps.

use crate::error::CollectionError;
use crate::models::{
    Autoscaler, ConfigMap, ContainerResources, Deployment, IngressRule, PortBinding, Service,
    Snapshot,
};
use k8s_openapi::api::apps::v1 as apps;
use k8s_openapi::api::autoscaling::v1 as autoscaling;
use k8s_openapi::api::core::v1 as core;
use k8s_openapi::api::networking::v1 as networking;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use std::collections::BTreeMap;
use tracing::debug;

/// Secret whose presence is recorded in every snapshot
pub const DEFAULT_CREDENTIAL_SECRET: &str = "harborcred";

/// Rendering of an unset request or limit
const ZERO_QUANTITY: &str = "0";

// autoscaling/v1 server-side defaults
const DEFAULT_REPLICAS: i32 = 1;
const DEFAULT_TARGET_CPU_PERCENT: i32 = 80;

/// Everything the collector fetched for one namespace on one cluster
#[derive(Debug, Clone, Default)]
pub struct RawResources {
    /// Label of the cluster the objects came from
    pub cluster: String,
    pub namespace: core::Namespace,
    pub pods: Vec<core::Pod>,
    pub deployments: Vec<apps::Deployment>,
    pub autoscalers: Vec<autoscaling::HorizontalPodAutoscaler>,
    pub services: Vec<core::Service>,
    pub config_maps: Vec<core::ConfigMap>,
    pub ingresses: Vec<networking::Ingress>,
    pub secrets: Vec<core::Secret>,
}

/// Build a snapshot of `namespace`, or fail without producing a partial one
pub fn build(
    namespace: &str,
    raw: RawResources,
    credential_secret: &str,
) -> Result<Snapshot, CollectionError> {
    if raw.namespace.metadata.name.as_deref() != Some(namespace) {
        return Err(CollectionError::NamespaceNotFound {
            cluster: raw.cluster,
            namespace: namespace.to_string(),
        });
    }

    let scope = Scope {
        cluster: &raw.cluster,
        namespace,
    };
    scope.check_all("Pod", raw.pods.iter().map(|o| &o.metadata))?;
    scope.check_all("Deployment", raw.deployments.iter().map(|o| &o.metadata))?;
    scope.check_all(
        "HorizontalPodAutoscaler",
        raw.autoscalers.iter().map(|o| &o.metadata),
    )?;
    scope.check_all("Service", raw.services.iter().map(|o| &o.metadata))?;
    scope.check_all("ConfigMap", raw.config_maps.iter().map(|o| &o.metadata))?;
    scope.check_all("Ingress", raw.ingresses.iter().map(|o| &o.metadata))?;
    scope.check_all("Secret", raw.secrets.iter().map(|o| &o.metadata))?;

    let snapshot = Snapshot {
        pod_count: raw.pods.len(),
        deployments: raw.deployments.iter().map(deployment).collect(),
        horizontal_autoscalers: raw.autoscalers.iter().map(autoscaler).collect(),
        services: raw.services.iter().map(service).collect(),
        config_maps: raw.config_maps.into_iter().map(config_map).collect(),
        ingress_rules: raw.ingresses.iter().flat_map(ingress_rules).collect(),
        has_credential_secret: raw
            .secrets
            .iter()
            .any(|s| s.metadata.name.as_deref() == Some(credential_secret)),
    };

    debug!(
        cluster = %raw.cluster,
        namespace = %namespace,
        pods = snapshot.pod_count,
        deployments = snapshot.deployments.len(),
        services = snapshot.services.len(),
        config_maps = snapshot.config_maps.len(),
        "Built namespace snapshot"
    );

    Ok(snapshot)
}

struct Scope<'a> {
    cluster: &'a str,
    namespace: &'a str,
}

impl Scope<'_> {
    fn check_all<'m>(
        &self,
        kind: &'static str,
        objects: impl IntoIterator<Item = &'m ObjectMeta>,
    ) -> Result<(), CollectionError> {
        for meta in objects {
            match meta.namespace.as_deref() {
                Some(ns) if ns != self.namespace => {
                    return Err(CollectionError::Inconsistent {
                        cluster: self.cluster.to_string(),
                        kind,
                        name: meta.name.clone().unwrap_or_default(),
                        reason: format!(
                            "belongs to namespace '{}', expected '{}'",
                            ns, self.namespace
                        ),
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn deployment(d: &apps::Deployment) -> Deployment {
    let spec = d.spec.as_ref();
    let containers = spec
        .and_then(|s| s.template.spec.as_ref())
        .map(|pod| pod.containers.iter().map(container_resources).collect())
        .unwrap_or_default();

    Deployment {
        replicas: spec.and_then(|s| s.replicas).unwrap_or(DEFAULT_REPLICAS),
        containers,
    }
}

fn container_resources(c: &core::Container) -> ContainerResources {
    let resources = c.resources.as_ref();
    let requests = resources.and_then(|r| r.requests.as_ref());
    let limits = resources.and_then(|r| r.limits.as_ref());

    ContainerResources {
        request_cpu: quantity(requests, "cpu"),
        request_memory: quantity(requests, "memory"),
        limit_cpu: quantity(limits, "cpu"),
        limit_memory: quantity(limits, "memory"),
    }
}

fn quantity(list: Option<&BTreeMap<String, Quantity>>, resource: &str) -> String {
    list.and_then(|l| l.get(resource))
        .map(|q| q.0.clone())
        .unwrap_or_else(|| ZERO_QUANTITY.to_string())
}

fn autoscaler(hpa: &autoscaling::HorizontalPodAutoscaler) -> Autoscaler {
    let spec = hpa.spec.as_ref();
    Autoscaler {
        min_replicas: spec
            .and_then(|s| s.min_replicas)
            .unwrap_or(DEFAULT_REPLICAS),
        max_replicas: spec.map(|s| s.max_replicas).unwrap_or_default(),
        target_cpu_utilization_percent: spec
            .and_then(|s| s.target_cpu_utilization_percentage)
            .unwrap_or(DEFAULT_TARGET_CPU_PERCENT),
    }
}

fn service(svc: &core::Service) -> Service {
    let ports = svc
        .spec
        .as_ref()
        .and_then(|s| s.ports.as_ref())
        .map(|ports| ports.iter().map(port_binding).collect())
        .unwrap_or_default();

    Service { ports }
}

fn port_binding(p: &core::ServicePort) -> PortBinding {
    // An unset targetPort routes to the service port
    let target_port = match &p.target_port {
        Some(IntOrString::Int(n)) => n.to_string(),
        Some(IntOrString::String(s)) => s.clone(),
        None => p.port.to_string(),
    };

    PortBinding {
        name: p.name.clone().unwrap_or_default(),
        port: p.port,
        protocol: p.protocol.clone().unwrap_or_default(),
        target_port,
    }
}

fn config_map(cm: core::ConfigMap) -> ConfigMap {
    ConfigMap {
        name: cm.metadata.name.unwrap_or_default(),
        data: cm.data.unwrap_or_default(),
    }
}

fn ingress_rules(ing: &networking::Ingress) -> Vec<IngressRule> {
    let Some(spec) = ing.spec.as_ref() else {
        return Vec::new();
    };

    let default_backend = spec.default_backend.iter();
    let path_backends = spec
        .rules
        .iter()
        .flatten()
        .filter_map(|rule| rule.http.as_ref())
        .flat_map(|http| http.paths.iter().map(|p| &p.backend));

    default_backend
        .chain(path_backends)
        .filter_map(|backend| backend.service.as_ref())
        .map(|svc| IngressRule {
            service_name: svc.name.clone(),
            service_port: svc
                .port
                .as_ref()
                .and_then(|port| {
                    port.number
                        .map(|n| n.to_string())
                        .or_else(|| port.name.clone())
                })
                .unwrap_or_default(),
        })
        .collect()
}
