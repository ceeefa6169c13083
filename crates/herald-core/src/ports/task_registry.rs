//! TaskRegistry port - action からタスクを引き当てる
//!
//! registry の永続化は dispatcher の責務外です。
//! ここではインターフェースだけを定義します。
//!
//! # 実装
//! - **InMemoryTaskRegistry**: 設定ファイルの `[[tasks]]` から構築（開発用）
//! - **RecordingRegistry**: テスト用（呼び出し回数・失敗の注入）

use async_trait::async_trait;

use crate::domain::{LookupFailure, TaskDescriptor};

/// TaskRegistry は action に束縛されたタスクを高々 1 件返す
///
/// # 戻り値
/// - `Ok(Some(_))`: 見つかった
/// - `Ok(None)`: 束縛なし（エラーではない）
/// - `Err(_)`: registry 自体の失敗
///
/// `None` と `Err` を混同しないこと。
#[async_trait]
pub trait TaskRegistry: Send + Sync {
    async fn lookup_task(&self, action: &str) -> Result<Option<TaskDescriptor>, LookupFailure>;
}
