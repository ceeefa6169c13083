//! herald-core
//!
//! Core building blocks for the Herald event-triggered task dispatcher.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（TriggerEvent, TaskDescriptor, ExecutionConfig, outcome, errors）
//! - **ports**: 抽象化レイヤー（TaskRegistry, ScriptEngine, ErrorReporter, EventSink, など）
//! - **app**: アプリケーションロジック（builder, dispatcher, completion, config_builder）
//! - **impls**: ports の実装（InMemoryTaskRegistry, ProcessScriptEngine, Recording* など）
//! - **settings**: TOML 設定の読み込み
//! - **observability**: dispatch の統計

pub mod app;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;
pub mod settings;

pub use app::{DispatchHandle, DispatcherBuilder, EventDispatcher};
pub use domain::{DispatchOutcome, TriggerEvent};
