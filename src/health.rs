use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::{ContainerState, ContainerStatus, Pod};
use std::time::Duration;

use crate::utils::to_time_delta;

/// How long a pod may sit in `Pending` before it counts as stuck.
pub const DEFAULT_STARTUP_GRACE: Duration = Duration::from_secs(2 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthPolicy {
    pub startup_grace: Duration,
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self {
            startup_grace: DEFAULT_STARTUP_GRACE,
        }
    }
}

impl HealthPolicy {
    /// Pods without a creation timestamp are treated as old.
    fn past_grace(&self, pod: &Pod, now: DateTime<Utc>) -> bool {
        match pod.metadata.creation_timestamp.as_ref() {
            Some(created) => {
                now.signed_duration_since(created.0) > to_time_delta(self.startup_grace)
            }
            None => true,
        }
    }
}

/// Decide whether a pod looks healthy at `now`.
///
/// A pod is unhealthy when it failed or is in an unknown phase, when it is
/// still pending after the startup grace period, or when any of its init or
/// regular containers restarted or terminated with a non-zero exit code.
pub fn is_healthy(pod: &Pod, now: DateTime<Utc>, policy: &HealthPolicy) -> bool {
    let Some(status) = pod.status.as_ref() else {
        return true;
    };
    match status.phase.as_deref() {
        Some("Failed") | Some("Unknown") => return false,
        Some("Pending") if policy.past_grace(pod, now) => return false,
        _ => {}
    }
    let mut containers = status
        .init_container_statuses
        .iter()
        .flatten()
        .chain(status.container_statuses.iter().flatten());
    !containers.any(container_failed)
}

fn container_failed(status: &ContainerStatus) -> bool {
    status.restart_count > 0
        || terminated_with_error(status.state.as_ref())
        || terminated_with_error(status.last_state.as_ref())
}

fn terminated_with_error(state: Option<&ContainerState>) -> bool {
    state
        .and_then(|s| s.terminated.as_ref())
        .is_some_and(|t| t.exit_code != 0)
}
