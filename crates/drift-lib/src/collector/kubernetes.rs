//! Collector backed by the Kubernetes API

use super::ResourceCollector;
use crate::builder::RawResources;
use crate::error::CollectionError;
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::autoscaling::v1::HorizontalPodAutoscaler;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, Pod, Secret, Service};
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::NamespaceResourceScope;
use kube::api::{Api, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config, Resource};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::path::Path;
use tracing::debug;

/// Reads a namespace's resources from one cluster
pub struct KubeCollector {
    cluster: String,
    client: Client,
}

impl KubeCollector {
    /// Create a collector around an existing client
    pub fn new(cluster: impl Into<String>, client: Client) -> Self {
        Self {
            cluster: cluster.into(),
            client,
        }
    }

    /// Create a collector from a kubeconfig file, optionally pinning a context
    pub async fn from_kubeconfig(
        cluster: impl Into<String>,
        path: &Path,
        context: Option<&str>,
    ) -> Result<Self, CollectionError> {
        let cluster = cluster.into();
        let kubeconfig_error = |source| CollectionError::Kubeconfig {
            cluster: cluster.clone(),
            path: path.to_path_buf(),
            source,
        };

        let kubeconfig = Kubeconfig::read_from(path).map_err(kubeconfig_error)?;
        let options = KubeConfigOptions {
            context: context.map(str::to_string),
            ..Default::default()
        };
        let config = Config::from_custom_kubeconfig(kubeconfig, &options)
            .await
            .map_err(kubeconfig_error)?;

        debug!(cluster = %cluster, url = %config.cluster_url, "Resolved kubeconfig");

        let client = Client::try_from(config).map_err(|source| CollectionError::Client {
            cluster: cluster.clone(),
            source,
        })?;

        Ok(Self::new(cluster, client))
    }

    async fn namespace(&self, name: &str) -> Result<Namespace, CollectionError> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        api.get(name).await.map_err(|e| match e {
            kube::Error::Api(resp) if resp.code == 404 => CollectionError::NamespaceNotFound {
                cluster: self.cluster.clone(),
                namespace: name.to_string(),
            },
            source => CollectionError::Api {
                cluster: self.cluster.clone(),
                kind: "namespaces",
                source,
            },
        })
    }

    async fn list<K>(&self, namespace: &str, kind: &'static str) -> Result<Vec<K>, CollectionError>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
        <K as Resource>::DynamicType: Default,
    {
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(|source| CollectionError::Api {
                cluster: self.cluster.clone(),
                kind,
                source,
            })?;

        debug!(cluster = %self.cluster, kind, count = list.items.len(), "Listed resources");
        Ok(list.items)
    }
}

#[async_trait]
impl ResourceCollector for KubeCollector {
    fn cluster(&self) -> &str {
        &self.cluster
    }

    async fn collect(&self, namespace: &str) -> Result<RawResources, CollectionError> {
        let ns = self.namespace(namespace).await?;

        let (pods, deployments, autoscalers, services, config_maps, ingresses, secrets) = tokio::try_join!(
            self.list::<Pod>(namespace, "pods"),
            self.list::<Deployment>(namespace, "deployments"),
            self.list::<HorizontalPodAutoscaler>(namespace, "horizontalpodautoscalers"),
            self.list::<Service>(namespace, "services"),
            self.list::<ConfigMap>(namespace, "configmaps"),
            self.list::<Ingress>(namespace, "ingresses"),
            self.list::<Secret>(namespace, "secrets"),
        )?;

        Ok(RawResources {
            cluster: self.cluster.clone(),
            namespace: ns,
            pods,
            deployments,
            autoscalers,
            services,
            config_maps,
            ingresses,
            secrets,
        })
    }
}
