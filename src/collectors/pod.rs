//! Pod metadata from the rkt pod runtime.

use std::collections::BTreeMap;
use std::time::Duration;

use bytes::Bytes;
use log::info;
use serde::{Deserialize, Serialize};

use crate::collectors::collectible::{Collectible, MemoizedContent};
use crate::collectors::command::ShellCommand;
use crate::constants::{PODS_DIR, POD_RUNTIME_TIMEOUT, POD_STATE_RUNNING};
use crate::error::CollectError;
use crate::runner;

/// A network a pod is attached to.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PodNetwork {
    #[serde(rename = "netName")]
    pub net_name: String,
    #[serde(default)]
    pub ip: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// One pod as reported by `rkt list --format=json`.
///
/// Fields the collector does not interpret are kept in `extra` so they still
/// reach the archive.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PodDescriptor {
    #[serde(rename = "name")]
    pub id: String,
    pub state: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub networks: Vec<PodNetwork>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub app_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<i64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl PodDescriptor {
    pub fn is_running(&self) -> bool {
        self.state == POD_STATE_RUNNING
    }
}

/// Source of the pods known to the pod runtime.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PodRuntime: Send + Sync {
    async fn list_pods(&self) -> Result<Vec<PodDescriptor>, CollectError>;
}

/// Queries pods through the `rkt` command line.
pub struct RktPodRuntime {
    timeout: Duration,
}

impl RktPodRuntime {
    pub fn new() -> Self {
        Self {
            timeout: POD_RUNTIME_TIMEOUT,
        }
    }
}

impl Default for RktPodRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PodRuntime for RktPodRuntime {
    async fn list_pods(&self) -> Result<Vec<PodDescriptor>, CollectError> {
        let argv = vec!["rkt".to_string(), "list".to_string(), "--format=json".to_string()];
        let output = runner::run(&argv, self.timeout)
            .await
            .map_err(|e| CollectError::ProducerUnavailable {
                producer: "rkt",
                reason: e.to_string(),
            })?;

        parse_pod_list(&output)
    }
}

/// Parse the JSON pod listing. `rkt` prints `null` when there are no pods.
pub fn parse_pod_list(output: &[u8]) -> Result<Vec<PodDescriptor>, CollectError> {
    let pods: Option<Vec<PodDescriptor>> =
        serde_json::from_slice(output).map_err(|e| CollectError::ProducerUnavailable {
            producer: "rkt",
            reason: format!("unexpected pod listing: {}", e),
        })?;
    Ok(pods.unwrap_or_default())
}

/// A pod descriptor rendered as YAML.
pub struct PodMetadata {
    pod: PodDescriptor,
    output: String,
    content: MemoizedContent,
}

impl PodMetadata {
    pub fn new(pod: PodDescriptor) -> Self {
        Self {
            output: format!("{}{}", PODS_DIR, pod.id),
            pod,
            content: MemoizedContent::new(),
        }
    }

    pub fn pod(&self) -> &PodDescriptor {
        &self.pod
    }

    async fn render(&self) -> Result<Vec<u8>, CollectError> {
        info!("Collecting pod data: {}", self.pod.id);
        serde_yaml::to_string(&self.pod)
            .map(String::into_bytes)
            .map_err(|e| CollectError::MalformedDocument(e.to_string()))
    }
}

#[async_trait::async_trait]
impl Collectible for PodMetadata {
    fn name(&self) -> &str {
        &self.output
    }

    async fn content(&self) -> Result<Bytes, CollectError> {
        self.content.get_or_try_init(self.render()).await
    }
}

/// The journal of a running pod's machine, archived next to its metadata.
pub fn pod_logs(id: &str, timeout: Duration) -> ShellCommand {
    let args = vec!["journalctl".to_string(), "-M".to_string(), format!("rkt-{}", id)];
    ShellCommand::new(args, None)
        .with_output(format!("{}{}.log", PODS_DIR, id))
        .with_timeout(timeout)
}
