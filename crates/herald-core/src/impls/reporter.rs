//! NotifyingReporter - tracing への診断ログ + Notifier への通知
//!
//! # 通知ポリシー
//! - Configuration / Execution: 常に通知
//! - Lookup: ログのみ（`notify_lookup_errors` が true なら通知も）

use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::domain::ErrorKind;
use crate::ports::{ErrorReporter, Notifier};

pub struct NotifyingReporter<N> {
    notifier: N,
    notify_lookup_errors: bool,
}

impl<N: Notifier> NotifyingReporter<N> {
    pub fn new(notifier: N, notify_lookup_errors: bool) -> Self {
        Self {
            notifier,
            notify_lookup_errors,
        }
    }

    fn should_notify(&self, kind: ErrorKind) -> bool {
        match kind {
            ErrorKind::Configuration | ErrorKind::Execution => true,
            ErrorKind::Lookup => self.notify_lookup_errors,
        }
    }
}

impl<N: Notifier> ErrorReporter for NotifyingReporter<N> {
    fn report(&self, kind: ErrorKind, detail: &str) {
        match kind {
            ErrorKind::Lookup => tracing::warn!(%kind, detail, "dispatch failed"),
            ErrorKind::Configuration | ErrorKind::Execution => {
                tracing::error!(%kind, detail, "dispatch failed")
            }
        }

        if !self.should_notify(kind) {
            return;
        }
        // notifier の panic は報告経路の外に出さない
        if catch_unwind(AssertUnwindSafe(|| self.notifier.notify(detail))).is_err() {
            tracing::error!(%kind, "notifier panicked while showing a failure");
        }
    }
}

/// TracingNotifier は通知を `herald::notify` target のログとして出す
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str) {
        tracing::info!(target: "herald::notify", "{message}");
    }
}
