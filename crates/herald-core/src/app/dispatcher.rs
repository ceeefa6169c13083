//! EventDispatcher - トリガーイベントを受け取ってタスクを実行する
//!
//! # フロー
//! 1. action を検証（空なら ConfigurationError、registry には触れない）
//! 2. lookup を専用タスクで実行（stage 1）
//! 3. 見つからなければ何もしない（エラーではない）
//! 4. 見つかれば CompletionPool にジョブを渡す（stage 2）
//!    - ExecutionConfig を組み立て、engine を呼ぶ
//! 5. 各段階の失敗は ErrorReporter で終端し、dispatch の呼び出し元には返さない
//!
//! # 順序保証
//! 1 件の dispatch の中では lookup < config-build < engine の順。
//! 別々の dispatch 間の順序は保証しない。

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::app::completion::{CompletionJob, CompletionPool, report};
use crate::domain::{
    DispatchId, DispatchOutcome, HeraldError, LookupFailure, TaskDescriptor, TriggerEvent,
};
use crate::observability::{DispatchCounts, DispatchStats};
use crate::ports::{ErrorReporter, IdGenerator, TaskRegistry};

/// EventDispatcher は DispatcherBuilder で構築する
///
/// # 使用例
/// ```ignore
/// let dispatcher = DispatcherBuilder::new()
///     .registry(registry)
///     .engine(engine)
///     .reporter(reporter)
///     .build()?;
///
/// // fire and forget
/// dispatcher.dispatch(TriggerEvent::new("ACTION_X"));
///
/// // 結果を待つ場合
/// let outcome = dispatcher.dispatch(event).outcome().await;
/// ```
///
/// dispatch() は runtime 外のスレッド（受信スレッドなど）からも呼べる。
/// タスクは build() 時に捕まえた runtime に spawn される。
pub struct EventDispatcher {
    runtime: Handle,
    registry: Arc<dyn TaskRegistry>,
    reporter: Arc<dyn ErrorReporter>,
    ids: Arc<dyn IdGenerator>,
    completion: CompletionPool,
    stats: Arc<DispatchStats>,
}

impl EventDispatcher {
    pub(crate) fn new(
        runtime: Handle,
        registry: Arc<dyn TaskRegistry>,
        reporter: Arc<dyn ErrorReporter>,
        ids: Arc<dyn IdGenerator>,
        completion: CompletionPool,
    ) -> Self {
        Self {
            runtime,
            registry,
            reporter,
            ids,
            completion,
            stats: Arc::new(DispatchStats::new()),
        }
    }

    /// Handle one trigger event.
    ///
    /// Returns before the lookup resolves. Never fails; every failure ends in
    /// the reporter. The handle can be dropped or awaited for the outcome.
    pub fn dispatch(&self, event: TriggerEvent) -> DispatchHandle {
        let dispatch_id = self.ids.generate_dispatch_id();
        tracing::debug!(%dispatch_id, action = event.action(), "trigger received");

        if !event.has_action() {
            report(self.reporter.as_ref(), &HeraldError::MissingAction);
            self.stats.record(DispatchOutcome::Rejected);
            return DispatchHandle::ready(dispatch_id, DispatchOutcome::Rejected);
        }

        let pipeline = Pipeline {
            dispatch_id,
            runtime: self.runtime.clone(),
            registry: Arc::clone(&self.registry),
            reporter: Arc::clone(&self.reporter),
            jobs: self.completion.sender(),
        };
        let stats = Arc::clone(&self.stats);
        let join = self.runtime.spawn(async move {
            let outcome = pipeline.run(event).await;
            stats.record(outcome);
            outcome
        });

        DispatchHandle {
            dispatch_id,
            state: HandleState::Pending(join),
        }
    }

    pub fn counts(&self) -> DispatchCounts {
        self.stats.snapshot()
    }

    /// Stop accepting completion jobs and wait for queued ones to finish.
    ///
    /// Lookups that resolve afterwards are reported as execution errors.
    pub async fn shutdown_and_join(self) {
        self.completion.shutdown_and_join().await;
    }
}

/// Per-dispatch state owned by the spawned stage-1 task.
struct Pipeline {
    dispatch_id: DispatchId,
    runtime: Handle,
    registry: Arc<dyn TaskRegistry>,
    reporter: Arc<dyn ErrorReporter>,
    jobs: mpsc::Sender<CompletionJob>,
}

impl Pipeline {
    async fn run(self, event: TriggerEvent) -> DispatchOutcome {
        let action = event.action().to_string();

        let descriptor = match self.lookup(&action).await {
            Ok(Some(descriptor)) => descriptor,
            Ok(None) => {
                tracing::debug!(dispatch_id = %self.dispatch_id, %action, "no task bound");
                return DispatchOutcome::NotFound;
            }
            Err(source) => {
                report(
                    self.reporter.as_ref(),
                    &HeraldError::Lookup { action, source },
                );
                return DispatchOutcome::LookupFailed;
            }
        };

        let (reply_tx, reply_rx) = oneshot::channel();
        let job = CompletionJob {
            dispatch_id: self.dispatch_id,
            descriptor,
            event,
            reply: reply_tx,
        };
        if self.jobs.send(job).await.is_err() {
            report(self.reporter.as_ref(), &HeraldError::CompletionClosed);
            return DispatchOutcome::ExecutionFailed;
        }

        match reply_rx.await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::error!(dispatch_id = %self.dispatch_id, "completion worker dropped the job");
                report(self.reporter.as_ref(), &HeraldError::CompletionClosed);
                DispatchOutcome::ExecutionFailed
            }
        }
    }

    /// Lookup runs in its own task so a panicking registry is a lookup error.
    async fn lookup(&self, action: &str) -> Result<Option<TaskDescriptor>, LookupFailure> {
        let registry = Arc::clone(&self.registry);
        let action = action.to_string();
        self.runtime
            .spawn(async move { registry.lookup_task(&action).await })
            .await
            .unwrap_or_else(|join_err| {
                Err(LookupFailure::new(format!("registry panicked: {join_err}")))
            })
    }
}

/// Handle to an in-flight dispatch.
///
/// Dropping it does not cancel anything.
pub struct DispatchHandle {
    dispatch_id: DispatchId,
    state: HandleState,
}

enum HandleState {
    Ready(DispatchOutcome),
    Pending(JoinHandle<DispatchOutcome>),
}

impl DispatchHandle {
    fn ready(dispatch_id: DispatchId, outcome: DispatchOutcome) -> Self {
        Self {
            dispatch_id,
            state: HandleState::Ready(outcome),
        }
    }

    pub fn dispatch_id(&self) -> DispatchId {
        self.dispatch_id
    }

    /// Wait for the dispatch to reach its terminal state.
    pub async fn outcome(self) -> DispatchOutcome {
        match self.state {
            HandleState::Ready(outcome) => outcome,
            HandleState::Pending(join) => join.await.unwrap_or_else(|e| {
                tracing::error!(dispatch_id = %self.dispatch_id, error = %e, "dispatch task aborted");
                DispatchOutcome::ExecutionFailed
            }),
        }
    }
}
