//! App - アプリケーション層
//!
//! ports を組み合わせて dispatch のロジックを実装します。
//!
//! # 主要コンポーネント
//! - **DispatcherBuilder**: 依存の注入と起動時検証
//! - **EventDispatcher**: トリガー受信 → lookup（stage 1）
//! - **CompletionPool**: config 組み立て → engine 実行（stage 2）
//! - **ExecutionConfigBuilder**: 実行設定の組み立て

pub mod builder;
pub mod completion;
pub mod config_builder;
pub mod dispatcher;

pub use self::builder::{BuildError, DispatcherBuilder};
pub use self::completion::finished_event;
pub use self::config_builder::ExecutionConfigBuilder;
pub use self::dispatcher::{DispatchHandle, EventDispatcher};
