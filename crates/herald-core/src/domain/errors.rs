//! Errors - エラー型と分類
//!
//! dispatcher の失敗は 3 種類のみ（ErrorKind）。
//! 「タスクが見つからない」はエラーではないので、ここには含めません。

use std::fmt;

use thiserror::Error;

/// ErrorReporter に渡すエラーの分類
///
/// - Configuration: dispatch/config-build への入力が不正（リトライしない）
/// - Lookup: registry 呼び出しが失敗（リトライしない）
/// - Execution: engine の実行が失敗
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    Lookup,
    Execution,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Configuration => "ConfigurationError",
            ErrorKind::Lookup => "LookupError",
            ErrorKind::Execution => "ExecutionError",
        };
        f.write_str(name)
    }
}

/// registry 側の失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LookupFailure {
    pub message: String,
}

impl LookupFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// engine 側の失敗
///
/// line/column はスクリプトの例外位置が分かる場合のみ。
/// `interrupted` は実行が外部から中断されたことを示す。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ExecutionFailure {
    pub message: String,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub interrupted: bool,
}

impl ExecutionFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            column: None,
            interrupted: false,
        }
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    pub fn interrupted(message: impl Into<String>) -> Self {
        Self {
            interrupted: true,
            ..Self::new(message)
        }
    }
}

/// EventSink 側の失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SinkFailure(pub String);

/// HeraldError は dispatch の各段階で起きるエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeraldError {
    #[error("trigger event has no action")]
    MissingAction,

    #[error("task bound to action '{action}' has an empty script path")]
    EmptyScriptPath { action: String },

    #[error("lookup failed for action '{action}': {source}")]
    Lookup {
        action: String,
        #[source]
        source: LookupFailure,
    },

    #[error("script '{script}' failed: {source}")]
    Execution {
        script: String,
        #[source]
        source: ExecutionFailure,
    },

    #[error("completion context closed")]
    CompletionClosed,
}

impl HeraldError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HeraldError::MissingAction | HeraldError::EmptyScriptPath { .. } => {
                ErrorKind::Configuration
            }
            HeraldError::Lookup { .. } => ErrorKind::Lookup,
            HeraldError::Execution { .. } | HeraldError::CompletionClosed => ErrorKind::Execution,
        }
    }
}
