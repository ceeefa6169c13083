//! ProcessScriptEngine - 外部インタプリタでスクリプトを実行する engine
//!
//! `<interpreter> <script_path>` を working_directory で起動し、
//! 引数を JSON にして環境変数 `HERALD_ARGUMENTS` で渡します。
//! RepeatPolicy に従って delay / loop_times / interval を守ります。

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::domain::{ExecutionConfig, ExecutionFailure, ExecutionReport};
use crate::ports::ScriptEngine;

/// 引数を渡す環境変数名
pub const ARGUMENTS_ENV: &str = "HERALD_ARGUMENTS";

pub struct ProcessScriptEngine {
    interpreter: String,
}

impl ProcessScriptEngine {
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
        }
    }

    async fn run_once(
        &self,
        script_path: &str,
        config: &ExecutionConfig,
        arguments: &str,
    ) -> Result<(), ExecutionFailure> {
        let output = Command::new(&self.interpreter)
            .arg(script_path)
            .current_dir(config.working_directory())
            .env(ARGUMENTS_ENV, arguments)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ExecutionFailure::new(format!("spawn {}: {e}", self.interpreter)))?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        match output.status.code() {
            // シグナルで止まった場合は exit code がない
            None => Err(ExecutionFailure::interrupted(format!(
                "{script_path} was terminated by a signal"
            ))),
            Some(code) if stderr.is_empty() => Err(ExecutionFailure::new(format!(
                "{script_path} exited with status {code}"
            ))),
            Some(_) => Err(ExecutionFailure::new(stderr.to_string())),
        }
    }
}

#[async_trait]
impl ScriptEngine for ProcessScriptEngine {
    async fn run_script(
        &self,
        script_path: &str,
        config: ExecutionConfig,
    ) -> Result<ExecutionReport, ExecutionFailure> {
        let arguments = serde_json::to_string(config.arguments())
            .map_err(|e| ExecutionFailure::new(format!("encode arguments: {e}")))?;
        let repeat = config.repeat();

        let mut runs = 0;
        for i in 0..repeat.loop_times {
            let wait = if i == 0 { repeat.delay } else { repeat.interval };
            if !wait.is_zero() {
                tokio::time::sleep(wait).await;
            }
            self.run_once(script_path, &config, &arguments).await?;
            runs += 1;
        }

        tracing::debug!(script = script_path, runs, "process engine finished");
        Ok(ExecutionReport { runs })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::domain::{Argument, INTENT_ARGUMENT, RepeatPolicy, TriggerEvent};
    use std::time::Duration;
    use tempfile::TempDir;

    fn write_script(dir: &TempDir, name: &str, body: &str) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn successful_script_reports_one_run() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "ok.sh", "exit 0\n");
        let engine = ProcessScriptEngine::new("sh");

        let report = engine
            .run_script(&script, ExecutionConfig::new(dir.path()))
            .await
            .unwrap();
        assert_eq!(report, ExecutionReport::single());
    }

    #[tokio::test]
    async fn non_zero_exit_carries_stderr() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "fail.sh", "echo boom >&2\nexit 3\n");
        let engine = ProcessScriptEngine::new("sh");

        let failure = engine
            .run_script(&script, ExecutionConfig::new(dir.path()))
            .await
            .unwrap_err();
        assert_eq!(failure.message, "boom");
        assert!(!failure.interrupted);
    }

    #[tokio::test]
    async fn non_zero_exit_without_stderr_reports_status() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "quiet.sh", "exit 4\n");
        let engine = ProcessScriptEngine::new("sh");

        let failure = engine
            .run_script(&script, ExecutionConfig::new(dir.path()))
            .await
            .unwrap_err();
        assert!(failure.message.contains("status 4"));
    }

    #[tokio::test]
    async fn arguments_and_working_directory_reach_the_script() {
        let dir = TempDir::new().unwrap();
        let script = write_script(
            &dir,
            "env.sh",
            "printf '%s' \"$HERALD_ARGUMENTS\" > args.json\n",
        );
        let engine = ProcessScriptEngine::new("sh");

        let mut config = ExecutionConfig::new(dir.path());
        config.set_argument(
            INTENT_ARGUMENT,
            Argument::Event(TriggerEvent::new("ACTION_X").with_attr("k", "v")),
        );
        engine.run_script(&script, config).await.unwrap();

        let written = std::fs::read_to_string(dir.path().join("args.json")).unwrap();
        let v: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(v["intent"]["action"], "ACTION_X");
        assert_eq!(v["intent"]["attrs"]["k"], "v");
    }

    #[tokio::test]
    async fn loop_times_runs_the_script_repeatedly() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "count.sh", "echo x >> runs.txt\n");
        let engine = ProcessScriptEngine::new("sh");

        let config = ExecutionConfig::new(dir.path()).with_repeat(RepeatPolicy {
            delay: Duration::ZERO,
            loop_times: 3,
            interval: Duration::from_millis(10),
        });
        let report = engine.run_script(&script, config).await.unwrap();

        assert_eq!(report.runs, 3);
        let runs = std::fs::read_to_string(dir.path().join("runs.txt")).unwrap();
        assert_eq!(runs.lines().count(), 3);
    }

    #[tokio::test]
    async fn missing_interpreter_is_an_execution_failure() {
        let dir = TempDir::new().unwrap();
        let engine = ProcessScriptEngine::new("herald-no-such-interpreter");

        let failure = engine
            .run_script("a.js", ExecutionConfig::new(dir.path()))
            .await
            .unwrap_err();
        assert!(failure.message.starts_with("spawn herald-no-such-interpreter"));
    }
}
