/// Todoのステータス
///
/// pending / completed / archived の3値のみを取り得る閉じた列挙型。
/// DynamoDB上ではStatusDateIndexのパーティションキーとして小文字文字列で保存される。
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 未知のステータス文字列を受け取った場合のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("status must be one of: pending, completed, archived (got {0:?})")]
pub struct TodoStatusError(pub String);

/// Todoのステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodoStatus {
    /// 未完了（作成時のデフォルト）
    #[default]
    Pending,
    /// 完了
    Completed,
    /// アーカイブ済み
    Archived,
}

impl TodoStatus {
    /// 受け付け可能な全ステータス
    pub const ALL: [TodoStatus; 3] = [
        TodoStatus::Pending,
        TodoStatus::Completed,
        TodoStatus::Archived,
    ];

    /// 保存・レスポンスに使う文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            TodoStatus::Pending => "pending",
            TodoStatus::Completed => "completed",
            TodoStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TodoStatus {
    type Err = TodoStatusError;

    /// 前後の空白を除去し、大文字小文字を区別せずにパースする
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        TodoStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| TodoStatusError(s.to_string()))
    }
}
