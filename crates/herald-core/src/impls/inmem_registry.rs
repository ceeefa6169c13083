//! InMemoryTaskRegistry - 開発用の registry
//!
//! # 実装詳細
//! - HashMap<String, TaskDescriptor> で action ごとに 1 件だけ保持
//! - RwLock で排他制御（lookup は並行、bind/unbind は排他）

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::{LookupFailure, TaskDescriptor};
use crate::ports::TaskRegistry;

/// RegistryError は InMemoryTaskRegistry の操作エラー
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("action '{0}' is already bound to a task")]
    AlreadyBound(String),

    #[error("registry lock poisoned")]
    Poisoned,
}

/// InMemoryTaskRegistry は action → TaskDescriptor の表
///
/// # 使用例
/// ```ignore
/// let registry = InMemoryTaskRegistry::new();
/// registry.bind(TaskDescriptor::new("ACTION_X", "/scripts/a.js"))?;
/// let task = registry.lookup_task("ACTION_X").await?;
/// ```
#[derive(Default)]
pub struct InMemoryTaskRegistry {
    bindings: RwLock<HashMap<String, TaskDescriptor>>,
}

impl InMemoryTaskRegistry {
    pub fn new() -> Self {
        Self {
            bindings: RwLock::new(HashMap::new()),
        }
    }

    /// 複数の束縛から構築（重複があれば最初の重複でエラー）
    pub fn from_bindings(
        descriptors: impl IntoIterator<Item = TaskDescriptor>,
    ) -> Result<Self, RegistryError> {
        let registry = Self::new();
        for descriptor in descriptors {
            registry.bind(descriptor)?;
        }
        Ok(registry)
    }

    pub fn bind(&self, descriptor: TaskDescriptor) -> Result<(), RegistryError> {
        let mut bindings = self.bindings.write().map_err(|_| RegistryError::Poisoned)?;
        if bindings.contains_key(descriptor.action()) {
            return Err(RegistryError::AlreadyBound(descriptor.action().to_string()));
        }
        bindings.insert(descriptor.action().to_string(), descriptor);
        Ok(())
    }

    pub fn unbind(&self, action: &str) -> Result<Option<TaskDescriptor>, RegistryError> {
        let mut bindings = self.bindings.write().map_err(|_| RegistryError::Poisoned)?;
        Ok(bindings.remove(action))
    }

    pub fn len(&self) -> usize {
        self.bindings.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TaskRegistry for InMemoryTaskRegistry {
    async fn lookup_task(&self, action: &str) -> Result<Option<TaskDescriptor>, LookupFailure> {
        let bindings = self
            .bindings
            .read()
            .map_err(|_| LookupFailure::new("registry lock poisoned"))?;
        Ok(bindings.get(action).cloned())
    }
}
