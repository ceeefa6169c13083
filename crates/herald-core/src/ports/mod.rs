//! Ports - 抽象化レイヤー
//!
//! dispatcher が呼び出す外部コンポーネント（registry, engine, 通知）への
//! インターフェースを定義します。dispatcher はこれらを constructor で
//! 受け取るだけで、グローバルなシングルトンには触れません。

pub mod clock;
pub mod error_reporter;
pub mod event_sink;
pub mod id_generator;
pub mod script_engine;
pub mod task_registry;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::error_reporter::{ErrorReporter, Notifier};
pub use self::event_sink::EventSink;
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::script_engine::ScriptEngine;
pub use self::task_registry::TaskRegistry;
