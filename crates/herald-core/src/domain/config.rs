//! ExecutionConfig - スクリプト 1 回分の実行設定
//!
//! dispatch ごとに新しく作られ、その dispatch だけが所有します。
//! 引数スロット `"intent"` にはトリガーイベントのコピーが入ります。

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::event::TriggerEvent;

/// トリガーイベントを格納する引数スロット名
pub const INTENT_ARGUMENT: &str = "intent";

/// 名前付き引数の値
///
/// untagged なので `action`（と任意の `attrs`）だけを持つ JSON は Event として
/// 復元されます。それ以外のキーを含むオブジェクトは Value のまま残ります。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Argument {
    Event(TriggerEvent),
    Value(serde_json::Value),
}

/// 繰り返し実行のパラメータ
///
/// - `delay`: 初回実行までの待ち時間
/// - `loop_times`: 実行回数（1 以上）
/// - `interval`: 2 回目以降の実行間隔
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatPolicy {
    pub delay: Duration,
    pub loop_times: u32,
    pub interval: Duration,
}

impl RepeatPolicy {
    pub fn once() -> Self {
        Self {
            delay: Duration::ZERO,
            loop_times: 1,
            interval: Duration::ZERO,
        }
    }
}

impl Default for RepeatPolicy {
    fn default() -> Self {
        Self::once()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    working_directory: PathBuf,
    #[serde(default)]
    arguments: BTreeMap<String, Argument>,
    #[serde(default)]
    repeat: RepeatPolicy,
}

impl ExecutionConfig {
    pub fn new(working_directory: impl Into<PathBuf>) -> Self {
        Self {
            working_directory: working_directory.into(),
            arguments: BTreeMap::new(),
            repeat: RepeatPolicy::once(),
        }
    }

    pub fn with_repeat(mut self, repeat: RepeatPolicy) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn set_argument(&mut self, name: impl Into<String>, value: Argument) {
        self.arguments.insert(name.into(), value);
    }

    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    pub fn arguments(&self) -> &BTreeMap<String, Argument> {
        &self.arguments
    }

    pub fn argument(&self, name: &str) -> Option<&Argument> {
        self.arguments.get(name)
    }

    /// `"intent"` スロットのイベントを取得
    pub fn intent(&self) -> Option<&TriggerEvent> {
        match self.arguments.get(INTENT_ARGUMENT) {
            Some(Argument::Event(event)) => Some(event),
            _ => None,
        }
    }

    pub fn repeat(&self) -> RepeatPolicy {
        self.repeat
    }
}
