use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// A file to copy verbatim into the archive.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FileSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// A command whose standard output goes into the archive.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// The static part of a snapshot: which files and commands to collect.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct SnapshotConfig {
    #[serde(default)]
    pub files: Vec<FileSpec>,
    #[serde(default)]
    pub commands: Vec<CommandSpec>,
}

impl SnapshotConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config = Self::from_yaml_str(&content)
            .context(format!("Failed to parse config file: {}", path.display()))?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse a YAML (or JSON) document
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse YAML config")
    }

    /// Save configuration to a YAML file
    pub fn save_to_yaml_file(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config to YAML")?;

        fs::write(path, yaml).context(format!("Failed to write config to {}", path.display()))?;

        info!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Warn about entries that can never produce anything.
    ///
    /// Returns the number of problems found; they are not fatal, the affected
    /// entries are simply skipped at run time.
    pub fn validate(&self) -> usize {
        let mut problems = 0;

        for (i, command) in self.commands.iter().enumerate() {
            if command.args.is_empty() || command.args[0].is_empty() {
                warn!("Command #{} has no program to run and will be skipped", i + 1);
                problems += 1;
            }
        }
        for (i, file) in self.files.iter().enumerate() {
            if file.name.is_empty() {
                warn!("File #{} has an empty name and will be skipped", i + 1);
                problems += 1;
            }
        }

        problems
    }

    /// Create a default configuration YAML file
    pub fn create_default_config_file(path: &Path) -> Result<()> {
        Self::default_host().save_to_yaml_file(path)
    }
}

/// Load the configuration at `config_path`, or the built-in default.
///
/// A path that was given but cannot be read or parsed is an error.
pub fn load_or_default(config_path: Option<&Path>) -> Result<SnapshotConfig> {
    match config_path {
        Some(path) => SnapshotConfig::from_yaml_file(path),
        None => {
            info!("No config path provided, using default configuration");
            Ok(SnapshotConfig::default_host())
        }
    }
}
