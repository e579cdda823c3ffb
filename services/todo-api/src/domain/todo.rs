/// Todoエンティティ
///
/// DynamoDBのTodoテーブル1アイテムに対応する。
/// todo_idがパーティションキー、(status, created_at)がStatusDateIndexのキー。
use serde::{Deserialize, Serialize};

use super::{Timestamp, TodoDraft, TodoStatus};

/// Todoレコード
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// 一意なID（UUID v4、作成後は不変）
    pub todo_id: String,
    /// タイトル（1-200文字）
    pub title: String,
    /// 説明（0-1000文字）
    #[serde(default)]
    pub description: String,
    /// ステータス
    pub status: TodoStatus,
    /// 作成日時（作成後は不変）
    pub created_at: Timestamp,
    /// 最終更新日時
    pub updated_at: Timestamp,
    /// 予約フィールド（現在は未使用、既存値は保持する）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Todo {
    /// 検証済みの入力から新しいTodoを作成
    ///
    /// IDを生成し、created_atとupdated_atに同じ時刻を設定する。
    /// descriptionとstatusは未指定ならデフォルト値（空文字列、pending）になる。
    pub fn create(draft: TodoDraft, now: Timestamp) -> Self {
        Self {
            todo_id: uuid::Uuid::new_v4().to_string(),
            title: draft.title,
            description: draft.description.unwrap_or_default(),
            status: draft.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
            user_id: None,
        }
    }

    /// 検証済みの入力を既存レコードにマージした新しいTodoを返す
    ///
    /// titleは常に置き換え、description/statusは指定された場合のみ置き換える。
    /// todo_id、created_at、user_idは変更しない。
    /// updated_atは`max(now, 既存のupdated_at)`となり、単調非減少を保つ。
    pub fn merged(&self, draft: TodoDraft, now: Timestamp) -> Self {
        Self {
            todo_id: self.todo_id.clone(),
            title: draft.title,
            description: draft.description.unwrap_or_else(|| self.description.clone()),
            status: draft.status.unwrap_or(self.status),
            created_at: self.created_at,
            updated_at: now.max(self.updated_at),
            user_id: self.user_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn ts(hour: u32) -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap())
    }

    fn draft(title: &str) -> TodoDraft {
        TodoDraft {
            title: title.to_string(),
            description: None,
            status: None,
        }
    }

    #[test]
    fn test_create_applies_defaults() {
        let todo = Todo::create(draft("Buy milk"), ts(9));

        assert_eq!(todo.title, "Buy milk");
        assert_eq!(todo.description, "");
        assert_eq!(todo.status, TodoStatus::Pending);
        assert_eq!(todo.created_at, todo.updated_at);
        assert!(todo.user_id.is_none());
        assert!(uuid::Uuid::parse_str(&todo.todo_id).is_ok());
    }

    #[test]
    fn test_create_generates_unique_ids() {
        let a = Todo::create(draft("a"), ts(9));
        let b = Todo::create(draft("a"), ts(9));
        assert_ne!(a.todo_id, b.todo_id);
    }

    #[test]
    fn test_merged_keeps_unspecified_fields() {
        let original = Todo::create(
            TodoDraft {
                title: "Old".to_string(),
                description: Some("keep me".to_string()),
                status: Some(TodoStatus::Completed),
            },
            ts(9),
        );

        let updated = original.merged(draft("New"), ts(10));

        assert_eq!(updated.todo_id, original.todo_id);
        assert_eq!(updated.title, "New");
        assert_eq!(updated.description, "keep me");
        assert_eq!(updated.status, TodoStatus::Completed);
        assert_eq!(updated.created_at, ts(9));
        assert_eq!(updated.updated_at, ts(10));
    }

    #[test]
    fn test_merged_replaces_specified_fields() {
        let original = Todo::create(draft("Old"), ts(9));
        let updated = original.merged(
            TodoDraft {
                title: "Old".to_string(),
                description: Some(String::new()),
                status: Some(TodoStatus::Archived),
            },
            ts(10),
        );

        assert_eq!(updated.description, "");
        assert_eq!(updated.status, TodoStatus::Archived);
    }

    #[test]
    fn test_merged_never_moves_updated_at_backwards() {
        let original = Todo::create(draft("Old"), ts(12));
        let updated = original.merged(draft("New"), ts(11));

        assert_eq!(updated.updated_at, ts(12));
        assert!(updated.created_at <= updated.updated_at);
    }

    #[test]
    fn test_merged_preserves_user_id() {
        let mut original = Todo::create(draft("Old"), ts(9));
        original.user_id = Some("user-1".to_string());

        let updated = original.merged(draft("New"), ts(10));
        assert_eq!(updated.user_id.as_deref(), Some("user-1"));
    }

    #[test]
    fn test_json_shape() {
        let todo = Todo::create(draft("Buy milk"), ts(9));
        let json = serde_json::to_value(&todo).unwrap();

        assert_eq!(json["title"], "Buy milk");
        assert_eq!(json["description"], "");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["created_at"], "2024-03-01T09:00:00.000000Z");
        assert_eq!(json["updated_at"], "2024-03-01T09:00:00.000000Z");
        assert!(json.get("user_id").is_none());
    }
}
