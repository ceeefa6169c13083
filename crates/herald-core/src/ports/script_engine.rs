//! ScriptEngine port - スクリプトの実行エンジン
//!
//! スクリプト言語やランタイムの実装は dispatcher の責務外です。
//!
//! # 実装
//! - **ProcessScriptEngine**: 外部インタプリタをプロセスとして起動
//! - **RecordingEngine**: テスト用

use async_trait::async_trait;

use crate::domain::{ExecutionConfig, ExecutionFailure, ExecutionReport};

/// ScriptEngine は script_path を config 付きで実行する
///
/// 実行は長時間かかる可能性があるため、dispatcher は completion context
/// （lookup とは別のワーカー）からのみ呼び出します。
#[async_trait]
pub trait ScriptEngine: Send + Sync {
    async fn run_script(
        &self,
        script_path: &str,
        config: ExecutionConfig,
    ) -> Result<ExecutionReport, ExecutionFailure>;
}
