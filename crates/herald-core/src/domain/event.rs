//! TriggerEvent - 外部から届くトリガーイベント
//!
//! action 名でタスクを引き当て、attrs はそのままスクリプトへ渡されます。
//! dispatcher は受け取ったイベントを書き換えません（handoff 時は clone）。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 実行完了時に EventSink へ流すイベントの action 名
pub const ACTION_ON_EXECUTION_FINISHED: &str = "ACTION_ON_EXECUTION_FINISHED";

/// 完了イベントの attrs キー
pub const EXTRA_EXCEPTION_MESSAGE: &str = "message";
pub const EXTRA_EXCEPTION_LINE_NUMBER: &str = "lineNumber";
pub const EXTRA_EXCEPTION_COLUMN_NUMBER: &str = "columnNumber";

/// TriggerEvent は action 名と付随データのセット
///
/// # 使用例
/// ```ignore
/// let event = TriggerEvent::new("ACTION_X").with_attr("k", "v");
/// dispatcher.dispatch(event);
/// ```
///
/// 未知のフィールドは拒否する（`Argument` の untagged 判定で情報を落とさないため）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriggerEvent {
    action: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attrs: BTreeMap<String, serde_json::Value>,
}

impl TriggerEvent {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            attrs: BTreeMap::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn insert_attr(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.attrs.insert(key.into(), value.into());
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    /// 空白だけの action も「未設定」とみなす
    pub fn has_action(&self) -> bool {
        !self.action.trim().is_empty()
    }

    pub fn attrs(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.attrs
    }

    pub fn attr(&self, key: &str) -> Option<&serde_json::Value> {
        self.attrs.get(key)
    }
}
