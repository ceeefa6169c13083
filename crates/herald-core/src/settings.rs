//! Settings loader.
//!
//! Reads a TOML file into [`HeraldSettings`]. A missing file yields the
//! defaults; a file that exists but cannot be read or parsed is an error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{RepeatPolicy, TaskDescriptor};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid settings: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeraldSettings {
    /// Number of completion workers (stage 2 of a dispatch).
    pub completion_workers: usize,
    /// Show lookup errors to the user, not only in the logs.
    pub notify_lookup_errors: bool,
    /// Working directory for scripts whose path has no parent component.
    pub default_working_dir: PathBuf,
    /// Emit `ACTION_ON_EXECUTION_FINISHED` after every execution.
    pub announce_finished: bool,
    pub execution: ExecutionSettings,
    pub engine: EngineSettings,
    pub tasks: Vec<TaskBinding>,
}

impl Default for HeraldSettings {
    fn default() -> Self {
        Self {
            completion_workers: 4,
            notify_lookup_errors: false,
            default_working_dir: PathBuf::from("."),
            announce_finished: false,
            execution: ExecutionSettings::default(),
            engine: EngineSettings::default(),
            tasks: Vec::new(),
        }
    }
}

impl HeraldSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.completion_workers == 0 {
            return Err(SettingsError::Invalid(
                "completion_workers must be at least 1".to_string(),
            ));
        }
        if self.execution.loop_times == 0 {
            return Err(SettingsError::Invalid(
                "execution.loop_times must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn task_descriptors(&self) -> impl Iterator<Item = TaskDescriptor> + '_ {
        self.tasks
            .iter()
            .map(|t| TaskDescriptor::new(t.action.clone(), t.script.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSettings {
    pub delay_ms: u64,
    pub interval_ms: u64,
    pub loop_times: u32,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            delay_ms: 0,
            interval_ms: 0,
            loop_times: 1,
        }
    }
}

impl ExecutionSettings {
    pub fn repeat_policy(&self) -> RepeatPolicy {
        RepeatPolicy {
            delay: Duration::from_millis(self.delay_ms),
            loop_times: self.loop_times,
            interval: Duration::from_millis(self.interval_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub interpreter: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            interpreter: "node".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskBinding {
    pub action: String,
    pub script: String,
}

/// Load settings from `path`.
///
/// - Missing file: [`HeraldSettings::default()`].
/// - Unreadable or unparseable file: `Err`.
/// - Parsed but invalid values: `Err(SettingsError::Invalid)`.
pub async fn load_settings(path: &Path) -> Result<HeraldSettings, SettingsError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No settings found at {}, using defaults", path.display());
            return Ok(HeraldSettings::default());
        }
        Err(source) => {
            return Err(SettingsError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let settings: HeraldSettings = toml::from_str(&content).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let settings = load_settings(&tmp.path().join("herald.toml")).await.unwrap();
        assert_eq!(settings, HeraldSettings::default());
        assert_eq!(settings.completion_workers, 4);
        assert_eq!(settings.execution.repeat_policy(), RepeatPolicy::once());
    }

    #[tokio::test]
    async fn valid_toml_is_parsed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("herald.toml");
        tokio::fs::write(
            &path,
            r#"
completion_workers = 2
notify_lookup_errors = true
default_working_dir = "/sdcard/scripts"

[execution]
delay_ms = 100
interval_ms = 50
loop_times = 3

[engine]
interpreter = "sh"

[[tasks]]
action = "ACTION_X"
script = "/scripts/a.js"
"#,
        )
        .await
        .unwrap();

        let settings = load_settings(&path).await.unwrap();
        assert_eq!(settings.completion_workers, 2);
        assert!(settings.notify_lookup_errors);
        assert!(!settings.announce_finished);
        assert_eq!(settings.default_working_dir, PathBuf::from("/sdcard/scripts"));
        assert_eq!(settings.engine.interpreter, "sh");
        assert_eq!(
            settings.execution.repeat_policy(),
            RepeatPolicy {
                delay: Duration::from_millis(100),
                loop_times: 3,
                interval: Duration::from_millis(50),
            }
        );
        let tasks: Vec<_> = settings.task_descriptors().collect();
        assert_eq!(tasks, vec![TaskDescriptor::new("ACTION_X", "/scripts/a.js")]);
    }

    #[tokio::test]
    async fn malformed_toml_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("herald.toml");
        tokio::fs::write(&path, "completion_workers = \"many\"").await.unwrap();

        let err = load_settings(&path).await.unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));
    }

    #[tokio::test]
    async fn zero_workers_is_invalid() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("herald.toml");
        tokio::fs::write(&path, "completion_workers = 0").await.unwrap();

        let err = load_settings(&path).await.unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(_)));
    }
}
