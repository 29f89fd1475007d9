use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::debug;

use crate::anonymize::{anonymize_cluster_version, redact_pod};
use crate::context::CallContext;
use crate::events::{EventWindow, collect_events};
use crate::health::{HealthPolicy, is_healthy};
use crate::kubernetes::{ClusterApi, KubeClusterApi};
use crate::types::{ID_RECORD, Payload, Record, Snapshot, Step, VERSION_RECORD, pod_record_name};

/// Name of the singleton ClusterVersion object.
pub const CLUSTER_VERSION_NAME: &str = "version";
pub const DEFAULT_NAMESPACE: &str = "openshift-cluster-version";
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Namespace of the cluster-version operator pods.
    pub namespace: String,
    /// Trailing window for event collection.
    pub interval: Duration,
    pub health: HealthPolicy,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            interval: DEFAULT_INTERVAL,
            health: HealthPolicy::default(),
        }
    }
}

/// Gathers the ClusterVersion, the cluster ID, the operator pods and, when
/// any of those pods is unhealthy, the recent events of their namespace.
pub struct SnapshotCollector {
    config: CollectorConfig,
}

impl SnapshotCollector {
    pub fn new(config: CollectorConfig) -> Self {
        Self { config }
    }

    pub async fn collect(&self, api: &dyn ClusterApi, ctx: &CallContext) -> Snapshot {
        self.collect_at(api, ctx, Utc::now()).await
    }

    pub async fn collect_at(
        &self,
        api: &dyn ClusterApi,
        ctx: &CallContext,
        now: DateTime<Utc>,
    ) -> Snapshot {
        let version = match ctx
            .run(Step::FetchClusterVersion, api.cluster_version(CLUSTER_VERSION_NAME))
            .await
        {
            Ok(Some(version)) => version,
            // Older clusters simply do not have the resource.
            Ok(None) => return Snapshot::default(),
            Err(err) => return Snapshot::failed(err),
        };

        let mut snapshot = Snapshot::default();
        let cluster_id = version.spec.cluster_id.clone();
        snapshot.push(Record::new(
            VERSION_RECORD,
            Payload::ClusterVersion(Box::new(anonymize_cluster_version(version))),
        ));
        if !cluster_id.is_empty() {
            snapshot.push(Record::new(ID_RECORD, Payload::Raw(cluster_id)));
        }

        let namespace = self.config.namespace.as_str();
        let pods = match ctx.run(Step::ListPods, api.list_pods(namespace)).await {
            Ok(pods) => pods,
            Err(err) => {
                snapshot.absorb(Step::ListPods, err);
                return snapshot;
            }
        };

        let mut unhealthy = 0;
        for mut pod in pods {
            redact_pod(&mut pod);
            if !is_healthy(&pod, now, &self.config.health) {
                unhealthy += 1;
            }
            let name = pod_record_name(
                pod.metadata.namespace.as_deref().unwrap_or(namespace),
                pod.metadata.name.as_deref().unwrap_or_default(),
            );
            snapshot.push(Record::new(name, Payload::Pod(Box::new(pod))));
        }

        if unhealthy == 0 {
            return snapshot;
        }
        debug!("Found {} unhealthy pods in {}", unhealthy, namespace);

        let window = EventWindow::trailing(now, self.config.interval);
        match collect_events(api, ctx, namespace, window).await {
            Ok(records) => snapshot.records.extend(records),
            Err(err) => snapshot.absorb(Step::CollectEvents, err),
        }
        snapshot
    }
}

/// Connects to the cluster and runs one pass. A client that cannot be built
/// fails the whole snapshot.
pub async fn gather_cluster_version(
    kube_context: Option<&str>,
    collector: &SnapshotCollector,
    ctx: &CallContext,
) -> Snapshot {
    let api = match ctx
        .run(Step::Connect, KubeClusterApi::connect(kube_context))
        .await
    {
        Ok(api) => api,
        Err(err) => return Snapshot::failed(err),
    };
    debug!("[{}] Collecting cluster version snapshot", api.context());
    collector.collect(&api, ctx).await
}
