//! Domain model (events, task descriptors, execution config, outcomes, errors).

pub mod config;
pub mod errors;
pub mod event;
pub mod ids;
pub mod outcome;
pub mod task;

pub use self::config::{Argument, ExecutionConfig, INTENT_ARGUMENT, RepeatPolicy};
pub use self::errors::{ErrorKind, ExecutionFailure, HeraldError, LookupFailure, SinkFailure};
pub use self::event::{ACTION_ON_EXECUTION_FINISHED, TriggerEvent};
pub use self::ids::DispatchId;
pub use self::outcome::{DispatchOutcome, ExecutionReport};
pub use self::task::TaskDescriptor;
