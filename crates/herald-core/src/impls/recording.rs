//! Recording doubles - テスト用の ports 実装
//!
//! 呼び出しを記録し、失敗や遅延を注入できます。
//! dispatcher のテストや、組み込み先の結合テストで使う想定です。

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{
    ErrorKind, ExecutionConfig, ExecutionFailure, ExecutionReport, LookupFailure, SinkFailure,
    TaskDescriptor, TriggerEvent,
};
use crate::impls::InMemoryTaskRegistry;
use crate::ports::{ErrorReporter, EventSink, ScriptEngine, TaskRegistry};

/// RecordingRegistry は lookup された action を記録する
///
/// `failing()` で作ると、すべての lookup が失敗します。
#[derive(Default)]
pub struct RecordingRegistry {
    inner: InMemoryTaskRegistry,
    failure: Option<LookupFailure>,
    lookups: Mutex<Vec<String>>,
}

impl RecordingRegistry {
    pub fn new(inner: InMemoryTaskRegistry) -> Self {
        Self {
            inner,
            failure: None,
            lookups: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(LookupFailure::new(message)),
            ..Self::default()
        }
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl TaskRegistry for RecordingRegistry {
    async fn lookup_task(&self, action: &str) -> Result<Option<TaskDescriptor>, LookupFailure> {
        self.lookups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(action.to_string());
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        self.inner.lookup_task(action).await
    }
}

/// RecordingEngine は run_script の呼び出し（script_path, config）を記録する
#[derive(Default)]
pub struct RecordingEngine {
    calls: Mutex<Vec<(String, ExecutionConfig)>>,
    failure: Option<ExecutionFailure>,
    latency: Option<Duration>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(failure: ExecutionFailure) -> Self {
        Self {
            failure: Some(failure),
            ..Self::default()
        }
    }

    /// 実行ごとに `latency` だけ待つ（長時間実行のシミュレーション）
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn calls(&self) -> Vec<(String, ExecutionConfig)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ScriptEngine for RecordingEngine {
    async fn run_script(
        &self,
        script_path: &str,
        config: ExecutionConfig,
    ) -> Result<ExecutionReport, ExecutionFailure> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((script_path.to_string(), config));
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match &self.failure {
            Some(failure) => Err(failure.clone()),
            None => Ok(ExecutionReport::single()),
        }
    }
}

/// RecordingReporter は report された (kind, detail) を記録する
#[derive(Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<(ErrorKind, String)>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<(ErrorKind, String)> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self, kind: ErrorKind) -> usize {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, kind: ErrorKind, detail: &str) {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((kind, detail.to_string()));
    }
}

/// RecordingSink は emit されたイベントを記録する
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<TriggerEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TriggerEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn emit(&self, event: TriggerEvent) -> Result<(), SinkFailure> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
        Ok(())
    }
}
