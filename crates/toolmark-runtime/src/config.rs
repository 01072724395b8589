use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use toolmark_providers::DEFAULT_MAX_UPLOAD_BYTES;
use toolmark_types::TaskDefinition;

pub const CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_ANNOTATOR: &str = "default_user";

/// Resolve the workspace data directory path based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. TOOLMARK_PATH environment variable (with tilde expansion)
/// 3. XDG data directory
/// 4. ~/.toolmark
pub fn resolve_workspace_path(explicit_path: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var("TOOLMARK_PATH") {
        return Ok(expand_tilde(&env_path));
    }

    if let Some(data_dir) = dirs::data_dir() {
        return Ok(data_dir.join("toolmark"));
    }

    if let Some(home) = std::env::var_os("HOME") {
        return Ok(PathBuf::from(home).join(".toolmark"));
    }

    Err(Error::Config(
        "Could not determine workspace path: no HOME directory or XDG data directory found"
            .to_string(),
    ))
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Largest file accepted by the import pipeline, in bytes
    pub max_upload_bytes: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    /// Name recorded on every annotation created from this workspace
    pub annotator: String,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            annotator: DEFAULT_ANNOTATOR.to_string(),
        }
    }
}

/// Preference-data tasks, declared as `[[rlhf.tasks]]` with nested `[[rlhf.tasks.samples]]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RlhfConfig {
    pub tasks: Vec<TaskDefinition>,
}

impl RlhfConfig {
    pub fn task(&self, task_id: &str) -> Option<&TaskDefinition> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub annotation: AnnotationConfig,
    #[serde(default, skip_serializing_if = "RlhfConfig::is_empty")]
    pub rlhf: RlhfConfig,
}

impl Config {
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<()> {
        if self.import.max_upload_bytes == 0 {
            return Err(Error::Config(
                "import.max_upload_bytes must be greater than zero".to_string(),
            ));
        }
        if self.annotation.annotator.trim().is_empty() {
            return Err(Error::Config(
                "annotation.annotator must not be empty".to_string(),
            ));
        }

        let mut task_ids = HashSet::new();
        for task in &self.rlhf.tasks {
            if task.id.trim().is_empty() {
                return Err(Error::Config("rlhf task id must not be empty".to_string()));
            }
            if !task_ids.insert(task.id.as_str()) {
                return Err(Error::Config(format!("duplicate rlhf task id '{}'", task.id)));
            }

            let mut sample_ids = HashSet::new();
            for sample in &task.samples {
                if !sample_ids.insert(sample.id.as_str()) {
                    return Err(Error::Config(format!(
                        "duplicate sample id '{}' in rlhf task '{}'",
                        sample.id, task.id
                    )));
                }
                if sample.responses.is_empty() {
                    tracing::warn!(task_id = %task.id, sample_id = %sample.id, "sample has no responses");
                }
            }
        }
        Ok(())
    }
}
