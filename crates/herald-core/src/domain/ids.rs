//! Domain identifiers.
//!
//! dispatch ごとに ULID ベースの DispatchId を発行し、ログの相関に使います。
//!
//! ## ULID の特性
//! - **時刻でソート可能**: timestamp が先頭にあるため、生成順序でソートできる
//! - **分散生成可能**: 調整なしで生成できる

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Identifier of one dispatch (one trigger event handled end to end).
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DispatchId(Ulid);

impl DispatchId {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl From<Ulid> for DispatchId {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl fmt::Display for DispatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dispatch-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_has_prefix() {
        let ulid = Ulid::new();
        let id = DispatchId::from_ulid(ulid);
        assert_eq!(id.as_ulid(), ulid);
        assert_eq!(id.to_string(), format!("dispatch-{ulid}"));
    }

    #[test]
    fn ids_are_sortable() {
        let id1 = DispatchId::from_ulid(Ulid::new());
        std::thread::sleep(std::time::Duration::from_millis(2)); // 時刻が進むのを待つ
        let id2 = DispatchId::from_ulid(Ulid::new());
        assert!(id1 < id2);
    }

    #[test]
    fn ids_can_be_serialized() {
        let id = DispatchId::from_ulid(Ulid::new());
        let s = serde_json::to_string(&id).unwrap();
        let back: DispatchId = serde_json::from_str(&s).unwrap();
        assert_eq!(id, back);
    }
}
