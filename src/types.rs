use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::error::is_interrupted;

pub const VERSION_RECORD: &str = "config/version";
pub const ID_RECORD: &str = "config/id";

pub fn pod_record_name(namespace: &str, name: &str) -> String {
    format!("config/pod/{}/{}", namespace, name)
}

pub fn events_record_name(namespace: &str) -> String {
    format!("events/{}", namespace)
}

/// The cluster-scoped `config.openshift.io/v1` ClusterVersion object.
///
/// Only the fields the snapshot looks at are typed; the rest of `spec` is
/// carried through untouched and the status is kept as opaque JSON.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ClusterVersion {
    #[serde(rename = "apiVersion", default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: ClusterVersionSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ClusterVersionSpec {
    #[serde(rename = "clusterID", default)]
    pub cluster_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl k8s_openapi::Resource for ClusterVersion {
    const API_VERSION: &'static str = "config.openshift.io/v1";
    const GROUP: &'static str = "config.openshift.io";
    const KIND: &'static str = "ClusterVersion";
    const VERSION: &'static str = "v1";
    const URL_PATH_SEGMENT: &'static str = "clusterversions";
    type Scope = k8s_openapi::ClusterResourceScope;
}

impl k8s_openapi::Metadata for ClusterVersion {
    type Ty = ObjectMeta;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

/// One event as it is stored in the archive.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompactedEvent {
    pub namespace: String,
    pub last_timestamp: DateTime<Utc>,
    pub reason: String,
    pub message: String,
    #[serde(rename = "type")]
    pub type_: String,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct CompactedEventList {
    pub items: Vec<CompactedEvent>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Payload {
    ClusterVersion(Box<ClusterVersion>),
    Pod(Box<Pod>),
    Events(CompactedEventList),
    Raw(String),
}

/// A named unit of diagnostic output.
#[derive(Clone, Debug, Serialize)]
pub struct Record {
    pub name: String,
    pub payload: Payload,
}

impl Record {
    pub fn new(name: impl Into<String>, payload: Payload) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }
}

/// Network-bound stages of a snapshot pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Connect,
    FetchClusterVersion,
    ListPods,
    CollectEvents,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Connect => "connect",
            Step::FetchClusterVersion => "fetch cluster version",
            Step::ListPods => "list pods",
            Step::CollectEvents => "collect events",
        };
        f.write_str(name)
    }
}

/// A failure that degraded the snapshot without invalidating it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Warning {
    pub step: Step,
    pub message: String,
}

/// Result of one collection pass.
///
/// `errors` holds fatal conditions only; `warnings` holds steps that failed
/// but let the pass continue with what it already had.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub records: Vec<Record>,
    pub errors: Vec<anyhow::Error>,
    pub warnings: Vec<Warning>,
}

impl Snapshot {
    pub fn failed(err: anyhow::Error) -> Self {
        Self {
            errors: vec![err],
            ..Default::default()
        }
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Interruptions are fatal for the step in progress, anything else is
    /// logged and kept as a warning.
    pub fn absorb(&mut self, step: Step, err: anyhow::Error) {
        if is_interrupted(&err) {
            self.errors.push(err);
            return;
        }
        debug!("Unable to {}: {:#}", step, err);
        self.warnings.push(Warning {
            step,
            message: format!("{:#}", err),
        });
    }
}
