//! ExecutionConfigBuilder - 解決済みタスクの実行設定を組み立てる
//!
//! 純粋な文字列/パス操作のみ（ファイルシステムには触れない）。

use std::path::{Path, PathBuf};

use crate::domain::{
    Argument, ExecutionConfig, HeraldError, INTENT_ARGUMENT, RepeatPolicy, TaskDescriptor,
    TriggerEvent,
};

/// ExecutionConfigBuilder は dispatch ごとに ExecutionConfig を作る
///
/// # 作業ディレクトリ
/// - スクリプトパスの親ディレクトリ
/// - 親を持たないパス（`"a.js"` や `"/"`）は `default_working_dir`
#[derive(Debug, Clone)]
pub struct ExecutionConfigBuilder {
    default_working_dir: PathBuf,
    repeat: RepeatPolicy,
}

impl ExecutionConfigBuilder {
    pub fn new(default_working_dir: impl Into<PathBuf>, repeat: RepeatPolicy) -> Self {
        Self {
            default_working_dir: default_working_dir.into(),
            repeat,
        }
    }

    pub fn build(
        &self,
        descriptor: &TaskDescriptor,
        event: &TriggerEvent,
    ) -> Result<ExecutionConfig, HeraldError> {
        let script_path = descriptor.script_path();
        if script_path.trim().is_empty() {
            return Err(HeraldError::EmptyScriptPath {
                action: descriptor.action().to_string(),
            });
        }

        let mut config =
            ExecutionConfig::new(self.working_directory_of(script_path)).with_repeat(self.repeat);
        config.set_argument(INTENT_ARGUMENT, Argument::Event(event.clone()));
        Ok(config)
    }

    fn working_directory_of(&self, script_path: &str) -> PathBuf {
        match Path::new(script_path).parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => self.default_working_dir.clone(),
        }
    }
}

impl Default for ExecutionConfigBuilder {
    fn default() -> Self {
        Self::new(".", RepeatPolicy::once())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::time::Duration;

    #[test]
    fn working_directory_is_script_parent() {
        let builder = ExecutionConfigBuilder::default();
        let descriptor = TaskDescriptor::new("ACTION_X", "/scripts/a.js");
        let event = TriggerEvent::new("ACTION_X").with_attr("k", "v");

        let config = builder.build(&descriptor, &event).unwrap();

        assert_eq!(config.working_directory(), Path::new("/scripts"));
        assert_eq!(config.intent(), Some(&event));
    }

    #[rstest]
    #[case::bare_file("a.js")]
    #[case::root("/")]
    fn parentless_script_uses_default_dir(#[case] script: &str) {
        let builder = ExecutionConfigBuilder::new("/sdcard/scripts", RepeatPolicy::once());
        let descriptor = TaskDescriptor::new("ACTION_X", script);

        let config = builder
            .build(&descriptor, &TriggerEvent::new("ACTION_X"))
            .unwrap();
        assert_eq!(config.working_directory(), Path::new("/sdcard/scripts"));
    }

    #[rstest]
    #[case::empty("")]
    #[case::blank("   ")]
    fn empty_script_path_is_configuration_error(#[case] script: &str) {
        let builder = ExecutionConfigBuilder::default();
        let descriptor = TaskDescriptor::new("ACTION_X", script);

        let err = builder
            .build(&descriptor, &TriggerEvent::new("ACTION_X"))
            .unwrap_err();
        assert_eq!(
            err,
            HeraldError::EmptyScriptPath {
                action: "ACTION_X".to_string()
            }
        );
    }

    #[test]
    fn later_mutation_of_event_does_not_reach_config() {
        let builder = ExecutionConfigBuilder::default();
        let descriptor = TaskDescriptor::new("ACTION_X", "/scripts/a.js");
        let mut event = TriggerEvent::new("ACTION_X").with_attr("k", "v");

        let config = builder.build(&descriptor, &event).unwrap();
        event.insert_attr("k", "mutated");

        let intent = config.intent().unwrap();
        assert_eq!(intent.attr("k"), Some(&serde_json::json!("v")));
    }

    #[test]
    fn repeat_policy_is_applied() {
        let repeat = RepeatPolicy {
            delay: Duration::from_millis(5),
            loop_times: 2,
            interval: Duration::from_millis(1),
        };
        let builder = ExecutionConfigBuilder::new(".", repeat);

        let config = builder
            .build(
                &TaskDescriptor::new("ACTION_X", "/scripts/a.js"),
                &TriggerEvent::new("ACTION_X"),
            )
            .unwrap();
        assert_eq!(config.repeat(), repeat);
    }
}
