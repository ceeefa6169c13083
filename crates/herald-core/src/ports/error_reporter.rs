//! ErrorReporter / Notifier ports - 失敗の報告経路
//!
//! dispatch の失敗はすべてここで終端します。

use crate::domain::ErrorKind;

/// ErrorReporter は dispatcher の失敗を受け取る side channel
///
/// # 契約
/// - panic しない
/// - ブロックしない（どの実行コンテキストからも呼ばれる）
pub trait ErrorReporter: Send + Sync {
    fn report(&self, kind: ErrorKind, detail: &str);
}

/// Notifier はユーザーに見える一時的な通知（toast など）
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}
