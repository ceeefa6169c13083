use async_trait::async_trait;

use crate::domain::{SinkFailure, TriggerEvent};
use crate::ports::EventSink;

/// LogEventSink は受け取ったイベントを info ログに書くだけの EventSink
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEventSink;

#[async_trait]
impl EventSink for LogEventSink {
    async fn emit(&self, event: TriggerEvent) -> Result<(), SinkFailure> {
        let attrs = serde_json::to_string(event.attrs()).map_err(|e| SinkFailure(e.to_string()))?;
        tracing::info!(action = event.action(), %attrs, "event emitted");
        Ok(())
    }
}
