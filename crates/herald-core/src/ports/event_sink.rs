//! EventSink port - 実行完了イベントの送り先
//!
//! `announce_finished` が有効なとき、実行ごとに
//! `ACTION_ON_EXECUTION_FINISHED` イベントを 1 件送ります。

use async_trait::async_trait;

use crate::domain::{SinkFailure, TriggerEvent};

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: TriggerEvent) -> Result<(), SinkFailure>;
}
