use k8s_openapi::api::core::v1::{Container, EnvVar, Pod};
use regex::Regex;
use std::sync::LazyLock;

use crate::types::ClusterVersion;

pub const REDACTED: &str = "<redacted>";

static URL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^.\-/:]").expect("valid url pattern"));
static SENSITIVE_ENV_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:^|[_.-])(?:tokens?|secrets?|password|passwd|pass|pwd|apikey|keys?|credentials?|auth|private)(?:[_.-]|$)",
    )
    .expect("valid env name pattern")
});

/// Mask every character of a URL except the separators, so only its shape
/// survives: `https://a.example.com/x` becomes `xxxxx://x.xxxxxxx.xxx/x`.
///
/// Hosts spelled only with `x` and separators, such as `x.xx`, come out
/// unchanged.
pub fn anonymize_url(raw: &str) -> String {
    URL_CHARS.replace_all(raw, "x").into_owned()
}

pub fn anonymize_cluster_version(mut version: ClusterVersion) -> ClusterVersion {
    if let Some(upstream) = version.spec.upstream.as_mut() {
        *upstream = anonymize_url(upstream);
    }
    version
}

/// Markers only count as whole `_`, `.` or `-` separated segments, so
/// `API_TOKEN` is sensitive but `KEYCLOAK_URL` is not.
pub fn is_sensitive_env_name(name: &str) -> bool {
    SENSITIVE_ENV_NAME.is_match(name)
}

fn redact_env(env: Option<&mut Vec<EnvVar>>) {
    for var in env.into_iter().flatten() {
        let has_value = var.value.as_deref().is_some_and(|v| !v.is_empty());
        if has_value && is_sensitive_env_name(&var.name) {
            var.value = Some(REDACTED.to_string());
        }
    }
}

/// Replace literal values of sensitive env vars in place. `valueFrom`
/// references carry no secret material and are kept.
pub fn redact_env_vars(containers: &mut [Container]) {
    for container in containers {
        redact_env(container.env.as_mut());
    }
}

pub fn redact_pod(pod: &mut Pod) {
    let Some(spec) = pod.spec.as_mut() else {
        return;
    };
    redact_env_vars(&mut spec.containers);
    if let Some(init) = spec.init_containers.as_mut() {
        redact_env_vars(init);
    }
    for ephemeral in spec.ephemeral_containers.iter_mut().flatten() {
        redact_env(ephemeral.env.as_mut());
    }
}
