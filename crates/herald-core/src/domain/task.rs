use serde::{Deserialize, Serialize};

/// action とスクリプトの束縛（registry が所有し、dispatcher は短命なコピーを読むだけ）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskDescriptor {
    action: String,
    script_path: String,
}

impl TaskDescriptor {
    pub fn new(action: impl Into<String>, script_path: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            script_path: script_path.into(),
        }
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn script_path(&self) -> &str {
        &self.script_path
    }
}
