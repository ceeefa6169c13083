//! Completion context: stage 2 of a dispatch.
//!
//! A fixed group of workers pulls `CompletionJob`s off a channel, builds the
//! execution config, runs the engine and reports failures. Lookups never run
//! here, so a slow script cannot stall the registry path.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::{Mutex, mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::app::config_builder::ExecutionConfigBuilder;
use crate::domain::event::{
    EXTRA_EXCEPTION_COLUMN_NUMBER, EXTRA_EXCEPTION_LINE_NUMBER, EXTRA_EXCEPTION_MESSAGE,
};
use crate::domain::{
    ACTION_ON_EXECUTION_FINISHED, DispatchId, DispatchOutcome, ExecutionFailure,
    ExecutionReport, HeraldError, TaskDescriptor, TriggerEvent,
};
use crate::ports::{ErrorReporter, EventSink, ScriptEngine};

const JOB_QUEUE_CAPACITY: usize = 256;

/// One resolved task waiting for execution.
///
/// `event` is the same snapshot the lookup was keyed by.
pub(crate) struct CompletionJob {
    pub dispatch_id: DispatchId,
    pub descriptor: TaskDescriptor,
    pub event: TriggerEvent,
    pub reply: oneshot::Sender<DispatchOutcome>,
}

/// Everything stage 2 needs, shared by all workers.
pub(crate) struct CompletionStage {
    pub engine: Arc<dyn ScriptEngine>,
    pub reporter: Arc<dyn ErrorReporter>,
    pub sink: Option<Arc<dyn EventSink>>,
    pub config_builder: ExecutionConfigBuilder,
    pub announce_finished: bool,
}

impl CompletionStage {
    /// build config → run engine → report. Returns the outcome.
    async fn complete(&self, job: &CompletionJob) -> DispatchOutcome {
        let script = job.descriptor.script_path().to_string();

        let config = match self.config_builder.build(&job.descriptor, &job.event) {
            Ok(config) => config,
            Err(err) => {
                report(self.reporter.as_ref(), &err);
                return DispatchOutcome::Rejected;
            }
        };

        tracing::debug!(
            dispatch_id = %job.dispatch_id,
            action = job.event.action(),
            script = %script,
            working_dir = %config.working_directory().display(),
            "running task"
        );

        // engine の panic は専用タスクに閉じ込める
        let engine = Arc::clone(&self.engine);
        let run_script = script.clone();
        let result = tokio::spawn(async move { engine.run_script(&run_script, config).await })
            .await
            .unwrap_or_else(|join_err| {
                Err(ExecutionFailure::new(format!("script engine panicked: {join_err}")))
            });

        let outcome = match &result {
            Ok(report) => {
                tracing::info!(
                    dispatch_id = %job.dispatch_id,
                    script = %script,
                    runs = report.runs,
                    "task finished"
                );
                DispatchOutcome::Executed
            }
            Err(failure) => {
                let err = HeraldError::Execution {
                    script: script.clone(),
                    source: failure.clone(),
                };
                report(self.reporter.as_ref(), &err);
                DispatchOutcome::ExecutionFailed
            }
        };

        self.announce(job.dispatch_id, &result).await;
        outcome
    }

    async fn announce(
        &self,
        dispatch_id: DispatchId,
        result: &Result<ExecutionReport, ExecutionFailure>,
    ) {
        if !self.announce_finished {
            return;
        }
        let Some(sink) = &self.sink else {
            return;
        };
        if let Err(e) = sink.emit(finished_event(result)).await {
            tracing::warn!(%dispatch_id, error = %e, "failed to announce finished execution");
        }
    }
}

/// Build the `ACTION_ON_EXECUTION_FINISHED` event for an execution result.
///
/// Failures carry line (-1 if unknown) and column (0 if unknown); the message
/// is left out when the run was interrupted.
pub fn finished_event(result: &Result<ExecutionReport, ExecutionFailure>) -> TriggerEvent {
    let event = TriggerEvent::new(ACTION_ON_EXECUTION_FINISHED);
    let Err(failure) = result else {
        return event;
    };

    let line = failure.line.map(i64::from).unwrap_or(-1);
    let column = failure.column.map(i64::from).unwrap_or(0);
    let event = event
        .with_attr(EXTRA_EXCEPTION_LINE_NUMBER, line)
        .with_attr(EXTRA_EXCEPTION_COLUMN_NUMBER, column);
    if failure.interrupted {
        event
    } else {
        event.with_attr(EXTRA_EXCEPTION_MESSAGE, failure.message.clone())
    }
}

pub(crate) fn report(reporter: &dyn ErrorReporter, err: &HeraldError) {
    reporter.report(err.kind(), &err.to_string());
}

/// Completion worker group handle.
/// - `shutdown_and_join()` で新規ジョブの受付を止め、キュー済みのジョブを
///   処理し終えてからワーカーを終了する
/// - 実行中の engine 呼び出しはキャンセルしない
pub(crate) struct CompletionPool {
    jobs_tx: mpsc::Sender<CompletionJob>,
    shutdown_tx: watch::Sender<bool>,
    joins: Vec<JoinHandle<()>>,
}

impl CompletionPool {
    /// Spawn `n` workers on `runtime`.
    pub fn spawn(runtime: &Handle, n: usize, stage: CompletionStage) -> Self {
        let (jobs_tx, jobs_rx) = mpsc::channel(JOB_QUEUE_CAPACITY);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let jobs_rx = Arc::new(Mutex::new(jobs_rx));
        let stage = Arc::new(stage);

        let mut joins = Vec::with_capacity(n);
        for worker_id in 0..n {
            let rx = Arc::clone(&jobs_rx);
            let stage = Arc::clone(&stage);
            let shutdown_rx = shutdown_rx.clone();
            joins.push(runtime.spawn(completion_loop(worker_id, rx, stage, shutdown_rx)));
        }

        Self {
            jobs_tx,
            shutdown_tx,
            joins,
        }
    }

    pub fn sender(&self) -> mpsc::Sender<CompletionJob> {
        self.jobs_tx.clone()
    }

    pub async fn shutdown_and_join(self) {
        // ignore send error: workers may already be gone
        let _ = self.shutdown_tx.send(true);
        for j in self.joins {
            let _ = j.await;
        }
    }
}

async fn completion_loop(
    worker_id: usize,
    jobs: Arc<Mutex<mpsc::Receiver<CompletionJob>>>,
    stage: Arc<CompletionStage>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut closing = false;
    loop {
        let job = {
            let mut rx = jobs.lock().await;
            if closing || *shutdown_rx.borrow() {
                // 受付を止めて、残りを drain する
                rx.close();
                closing = true;
            }
            if closing {
                rx.recv().await
            } else {
                tokio::select! {
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() {
                            closing = true;
                        }
                        continue;
                    }
                    job = rx.recv() => job,
                }
            }
        };

        let Some(job) = job else {
            tracing::debug!(worker_id, "completion worker stopped");
            break;
        };

        let outcome = stage.complete(&job).await;
        // the dispatcher may have dropped the handle; that's fine
        let _ = job.reply.send(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finished_event_on_success_has_no_attrs() {
        let event = finished_event(&Ok(ExecutionReport::single()));
        assert_eq!(event.action(), ACTION_ON_EXECUTION_FINISHED);
        assert!(event.attrs().is_empty());
    }

    #[test]
    fn finished_event_on_failure_carries_position_and_message() {
        let failure = ExecutionFailure::new("ReferenceError").at(12, 4);
        let event = finished_event(&Err(failure));

        assert_eq!(event.attr(EXTRA_EXCEPTION_MESSAGE), Some(&serde_json::json!("ReferenceError")));
        assert_eq!(event.attr(EXTRA_EXCEPTION_LINE_NUMBER), Some(&serde_json::json!(12)));
        assert_eq!(event.attr(EXTRA_EXCEPTION_COLUMN_NUMBER), Some(&serde_json::json!(4)));
    }

    #[test]
    fn finished_event_defaults_unknown_position() {
        let event = finished_event(&Err(ExecutionFailure::new("boom")));
        assert_eq!(event.attr(EXTRA_EXCEPTION_LINE_NUMBER), Some(&serde_json::json!(-1)));
        assert_eq!(event.attr(EXTRA_EXCEPTION_COLUMN_NUMBER), Some(&serde_json::json!(0)));
    }

    #[test]
    fn interrupted_execution_omits_message() {
        let event = finished_event(&Err(ExecutionFailure::interrupted("stopped")));
        assert!(event.attr(EXTRA_EXCEPTION_MESSAGE).is_none());
        assert!(event.attr(EXTRA_EXCEPTION_LINE_NUMBER).is_some());
    }
}
