use anyhow::Context;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Event, Pod};
use kube::{Api, Client, api::ListParams, config};
use tracing::info;

use crate::types::ClusterVersion;

/// The calls a snapshot pass makes against a cluster.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Fetches a ClusterVersion by name; `Ok(None)` when it does not exist.
    async fn cluster_version(&self, name: &str) -> anyhow::Result<Option<ClusterVersion>>;

    async fn list_pods(&self, namespace: &str) -> anyhow::Result<Vec<Pod>>;

    async fn list_events(&self, namespace: &str) -> anyhow::Result<Vec<Event>>;
}

/// [`ClusterApi`] backed by a kube client.
#[derive(Clone)]
pub struct KubeClusterApi {
    context: String,
    client: Client,
}

impl KubeClusterApi {
    /// Builds a client for the named kubeconfig context, or for the inferred
    /// configuration (current context or in-cluster) when none is given.
    pub async fn connect(context: Option<&str>) -> anyhow::Result<Self> {
        let (context, config) = match context {
            Some(ctx) => {
                let config = config::Config::from_kubeconfig(&config::KubeConfigOptions {
                    context: Some(ctx.to_string()),
                    ..Default::default()
                })
                .await
                .map_err(|e| anyhow::anyhow!("Context '{}' not found in kubeconfig: {}", ctx, e))?;
                (ctx.to_string(), config)
            }
            None => {
                let current = config::Kubeconfig::read()
                    .ok()
                    .and_then(|kubeconfig| kubeconfig.current_context)
                    .unwrap_or_else(|| "in-cluster".to_string());
                (current, config::Config::infer().await?)
            }
        };
        let client = Client::try_from(config)?;
        info!("Using context: {}", context);
        Ok(Self { context, client })
    }

    pub fn context(&self) -> &str {
        &self.context
    }
}

#[async_trait]
impl ClusterApi for KubeClusterApi {
    async fn cluster_version(&self, name: &str) -> anyhow::Result<Option<ClusterVersion>> {
        let api: Api<ClusterVersion> = Api::all(self.client.clone());
        api.get_opt(name)
            .await
            .with_context(|| format!("[{}] fetching clusterversion/{}", self.context, name))
    }

    async fn list_pods(&self, namespace: &str) -> anyhow::Result<Vec<Pod>> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let pods = api
            .list(&ListParams::default())
            .await
            .with_context(|| format!("[{}] listing pods in {}", self.context, namespace))?;
        Ok(pods.items)
    }

    async fn list_events(&self, namespace: &str) -> anyhow::Result<Vec<Event>> {
        let api: Api<Event> = Api::namespaced(self.client.clone(), namespace);
        let events = api
            .list(&ListParams::default())
            .await
            .with_context(|| format!("[{}] listing events in {}", self.context, namespace))?;
        Ok(events.items)
    }
}
