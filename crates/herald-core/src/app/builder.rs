//! DispatcherBuilder - EventDispatcher の構築とワイヤリング
//!
//! registry / engine / reporter はすべて明示的に注入します。
//! 不足があれば build() 時に BuildError を返します（Fail-fast）。

use std::sync::Arc;

use tokio::runtime::Handle;

use crate::app::completion::{CompletionPool, CompletionStage};
use crate::app::config_builder::ExecutionConfigBuilder;
use crate::app::dispatcher::EventDispatcher;
use crate::ports::{
    ErrorReporter, EventSink, IdGenerator, ScriptEngine, SystemClock, TaskRegistry,
    UlidGenerator,
};
use crate::settings::HeraldSettings;

/// DispatcherBuilder は EventDispatcher を構築
///
/// # 使用例
/// ```ignore
/// let dispatcher = DispatcherBuilder::new()
///     .registry(Arc::new(registry))
///     .engine(Arc::new(ProcessScriptEngine::new("node")))
///     .reporter(Arc::new(NotifyingReporter::new(TracingNotifier, false)))
///     .settings(settings)
///     .build()?;
/// ```
///
/// build() は completion worker を spawn するため、tokio runtime の中で呼ぶこと。
/// その runtime の Handle を EventDispatcher が保持する。
#[derive(Default)]
pub struct DispatcherBuilder {
    registry: Option<Arc<dyn TaskRegistry>>,
    engine: Option<Arc<dyn ScriptEngine>>,
    reporter: Option<Arc<dyn ErrorReporter>>,
    sink: Option<Arc<dyn EventSink>>,
    ids: Option<Arc<dyn IdGenerator>>,
    settings: HeraldSettings,
}

/// BuildError は EventDispatcher 構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("missing collaborator: {0}. Call DispatcherBuilder::{0}() before build().")]
    MissingCollaborator(&'static str),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("build() must be called inside a tokio runtime")]
    NoRuntime,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(mut self, registry: Arc<dyn TaskRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn engine(mut self, engine: Arc<dyn ScriptEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// 完了イベントの送り先（`announce_finished` が true のときだけ使われる）
    pub fn sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// 省略時は `UlidGenerator<SystemClock>`
    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn settings(mut self, settings: HeraldSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> Result<EventDispatcher, BuildError> {
        let registry = self
            .registry
            .ok_or(BuildError::MissingCollaborator("registry"))?;
        let engine = self
            .engine
            .ok_or(BuildError::MissingCollaborator("engine"))?;
        let reporter = self
            .reporter
            .ok_or(BuildError::MissingCollaborator("reporter"))?;
        self.settings
            .validate()
            .map_err(|e| BuildError::InvalidSettings(e.to_string()))?;

        if self.settings.announce_finished && self.sink.is_none() {
            tracing::warn!("announce_finished is set but no event sink was provided");
        }

        let runtime = Handle::try_current().map_err(|_| BuildError::NoRuntime)?;

        let ids = self
            .ids
            .unwrap_or_else(|| Arc::new(UlidGenerator::new(SystemClock)));

        let stage = CompletionStage {
            engine,
            reporter: Arc::clone(&reporter),
            sink: self.sink,
            config_builder: ExecutionConfigBuilder::new(
                self.settings.default_working_dir.clone(),
                self.settings.execution.repeat_policy(),
            ),
            announce_finished: self.settings.announce_finished,
        };
        let completion = CompletionPool::spawn(&runtime, self.settings.completion_workers, stage);

        Ok(EventDispatcher::new(runtime, registry, reporter, ids, completion))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::{InMemoryTaskRegistry, RecordingEngine, RecordingReporter};

    #[tokio::test]
    async fn test_build_success() {
        let dispatcher = DispatcherBuilder::new()
            .registry(Arc::new(InMemoryTaskRegistry::new()))
            .engine(Arc::new(RecordingEngine::new()))
            .reporter(Arc::new(RecordingReporter::new()))
            .build();
        assert!(dispatcher.is_ok());
    }

    #[tokio::test]
    async fn test_build_missing_engine() {
        let dispatcher = DispatcherBuilder::new()
            .registry(Arc::new(InMemoryTaskRegistry::new()))
            .reporter(Arc::new(RecordingReporter::new()))
            .build();
        assert!(matches!(
            dispatcher,
            Err(BuildError::MissingCollaborator("engine"))
        ));
    }

    #[tokio::test]
    async fn test_build_rejects_zero_workers() {
        let dispatcher = DispatcherBuilder::new()
            .registry(Arc::new(InMemoryTaskRegistry::new()))
            .engine(Arc::new(RecordingEngine::new()))
            .reporter(Arc::new(RecordingReporter::new()))
            .settings(HeraldSettings {
                completion_workers: 0,
                ..HeraldSettings::default()
            })
            .build();
        assert!(matches!(dispatcher, Err(BuildError::InvalidSettings(_))));
    }

    #[test]
    fn test_build_outside_runtime_is_error() {
        let dispatcher = DispatcherBuilder::new()
            .registry(Arc::new(InMemoryTaskRegistry::new()))
            .engine(Arc::new(RecordingEngine::new()))
            .reporter(Arc::new(RecordingReporter::new()))
            .build();
        assert!(matches!(dispatcher, Err(BuildError::NoRuntime)));
    }
}
