//! Impls - ports の実装（開発用・テスト用）
//!
//! # 含まれる実装
//! - **InMemoryTaskRegistry**: 設定から構築する registry
//! - **ProcessScriptEngine**: 外部インタプリタを起動する engine
//! - **NotifyingReporter / TracingNotifier**: 失敗のログと通知
//! - **LogEventSink**: 完了イベントをログに書く sink
//! - **Recording\***: テスト用の記録付き実装

pub mod inmem_registry;
pub mod log_sink;
pub mod process_engine;
pub mod recording;
pub mod reporter;

pub use self::inmem_registry::{InMemoryTaskRegistry, RegistryError};
pub use self::log_sink::LogEventSink;
pub use self::process_engine::{ARGUMENTS_ENV, ProcessScriptEngine};
pub use self::recording::{RecordingEngine, RecordingRegistry, RecordingReporter, RecordingSink};
pub use self::reporter::{NotifyingReporter, TracingNotifier};
