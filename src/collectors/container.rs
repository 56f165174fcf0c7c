//! Container runtime metadata.
//!
//! Each container contributes its redacted config document. In danger mode the
//! container's own log output is collected as well.

use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::Bytes;
use log::{debug, info, warn};
use tokio::io::AsyncReadExt;
use walkdir::WalkDir;

use crate::collectors::collectible::{Collectible, MemoizedContent};
use crate::collectors::command::ShellCommand;
use crate::constants::{CONTAINERS_DIR, DOCKER_CONFIG_FILE, DOCKER_CONTAINERS_DIR};
use crate::error::CollectError;
use crate::security::redactor::Redactor;

/// A container known to the runtime and the location of its config document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRef {
    pub id: String,
    pub config_path: PathBuf,
}

/// Source of the containers present on the host.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ContainerSource: Send + Sync {
    async fn list_containers(&self) -> Result<Vec<ContainerRef>, CollectError>;
}

/// Enumerates containers from docker's on-disk state directory.
pub struct DockerConfigDir {
    root: PathBuf,
}

impl DockerConfigDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Default for DockerConfigDir {
    fn default() -> Self {
        Self::new(DOCKER_CONTAINERS_DIR)
    }
}

#[async_trait::async_trait]
impl ContainerSource for DockerConfigDir {
    async fn list_containers(&self) -> Result<Vec<ContainerRef>, CollectError> {
        let metadata = std::fs::metadata(&self.root).map_err(|e| CollectError::ProducerUnavailable {
            producer: "docker",
            reason: format!("{}: {}", self.root.display(), e),
        })?;
        if !metadata.is_dir() {
            return Err(CollectError::ProducerUnavailable {
                producer: "docker",
                reason: format!("{} is not a directory", self.root.display()),
            });
        }

        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name();

        let mut containers = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable container entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }

            let config_path = entry.path().join(DOCKER_CONFIG_FILE);
            if !config_path.is_file() {
                warn!("Container directory {:?} has no {}", entry.path(), DOCKER_CONFIG_FILE);
                continue;
            }

            containers.push(ContainerRef {
                id: entry.file_name().to_string_lossy().into_owned(),
                config_path,
            });
        }

        debug!("Found {} containers under {}", containers.len(), self.root.display());
        Ok(containers)
    }
}

/// The redacted config document of one container.
pub struct ContainerMetadata {
    id: String,
    config_path: PathBuf,
    output: String,
    redactor: Redactor,
    content: MemoizedContent,
}

impl ContainerMetadata {
    pub fn new(container: ContainerRef, redactor: Redactor) -> Self {
        Self {
            output: format!("{}{}", CONTAINERS_DIR, container.id),
            id: container.id,
            config_path: container.config_path,
            redactor,
            content: MemoizedContent::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    async fn inspect(&self) -> Result<Vec<u8>, CollectError> {
        info!("Collecting configuration of container {:?}", self.id);

        let mut file = tokio::fs::File::open(&self.config_path)
            .await
            .map_err(|source| CollectError::Open {
                path: self.config_path.clone(),
                source,
            })?;
        let mut raw = Vec::new();
        file.read_to_end(&mut raw)
            .await
            .map_err(|source| CollectError::Read {
                path: self.config_path.clone(),
                source,
            })?;

        Ok(self.redactor.redact_bytes(&raw, &self.id))
    }
}

#[async_trait::async_trait]
impl Collectible for ContainerMetadata {
    fn name(&self) -> &str {
        &self.output
    }

    async fn content(&self) -> Result<Bytes, CollectError> {
        self.content.get_or_try_init(self.inspect()).await
    }
}

/// `docker logs <id>`, archived next to the container's metadata.
pub fn container_logs(id: &str, timeout: Duration) -> ShellCommand {
    let args = vec!["docker".to_string(), "logs".to_string(), id.to_string()];
    ShellCommand::new(args, None)
        .with_output(format!("{}{}.log", CONTAINERS_DIR, id))
        .with_timeout(timeout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::UNRECOGNIZED_FORMAT;
    use std::fs;
    use tempfile::TempDir;

    fn write_container(root: &Path, id: &str, config: &str) -> PathBuf {
        let dir = root.join(id);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(DOCKER_CONFIG_FILE);
        fs::write(&path, config).unwrap();
        path
    }

    #[tokio::test]
    async fn test_docker_config_dir_lists_containers() {
        let temp_dir = TempDir::new().unwrap();
        write_container(temp_dir.path(), "bbb", "{}");
        write_container(temp_dir.path(), "aaa", "{}");
        fs::create_dir(temp_dir.path().join("no-config")).unwrap();
        fs::write(temp_dir.path().join("stray-file"), "x").unwrap();

        let source = DockerConfigDir::new(temp_dir.path());
        let containers = source.list_containers().await.unwrap();

        let ids: Vec<_> = containers.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["aaa", "bbb"]);
        assert_eq!(containers[0].config_path, temp_dir.path().join("aaa").join(DOCKER_CONFIG_FILE));
    }

    #[tokio::test]
    async fn test_missing_root_is_unavailable() {
        let source = DockerConfigDir::new("/nonexistent/docker/containers");
        let result = source.list_containers().await;
        assert!(matches!(result, Err(CollectError::ProducerUnavailable { producer: "docker", .. })));
    }

    #[tokio::test]
    async fn test_container_metadata_is_redacted() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = write_container(
            temp_dir.path(),
            "c1",
            r#"{"Config": {"Env": ["POSTGRES_PASSWORD=mysecretpassword"]}}"#,
        );

        let container = ContainerMetadata::new(
            ContainerRef { id: "c1".to_string(), config_path },
            Redactor::safe(),
        );
        assert_eq!(container.name(), "/containers/c1");

        let content = container.content().await.unwrap();
        let text = std::str::from_utf8(&content).unwrap();
        assert!(text.contains("POSTGRES_PASSWORD=<REDACTED>"));
        assert!(!text.contains("mysecretpassword"));
        assert_eq!(container.header().await.unwrap().size, content.len() as u64);
    }

    #[tokio::test]
    async fn test_malformed_config_becomes_placeholder() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = write_container(temp_dir.path(), "c2", "{not json");

        let container = ContainerMetadata::new(
            ContainerRef { id: "c2".to_string(), config_path },
            Redactor::safe(),
        );
        assert_eq!(&container.content().await.unwrap()[..], UNRECOGNIZED_FORMAT.as_bytes());
    }

    #[tokio::test]
    async fn test_unreadable_config_is_an_error() {
        let container = ContainerMetadata::new(
            ContainerRef {
                id: "gone".to_string(),
                config_path: PathBuf::from("/nonexistent/config.v2.json"),
            },
            Redactor::safe(),
        );
        assert!(matches!(container.content().await, Err(CollectError::Open { .. })));
    }

    #[test]
    fn test_container_logs_command() {
        let cmd = container_logs("abc", Duration::from_secs(1));
        assert_eq!(cmd.name(), "/containers/abc.log");
        assert_eq!(cmd.args(), &["docker", "logs", "abc"]);
    }

    #[tokio::test]
    async fn test_mock_source() {
        let mut source = MockContainerSource::new();
        source.expect_list_containers().returning(|| Err(CollectError::ProducerUnavailable {
            producer: "docker",
            reason: "daemon not running".to_string(),
        }));
        assert!(source.list_containers().await.is_err());
    }
}
