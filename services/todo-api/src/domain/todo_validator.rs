/// Todo入力のバリデーション
///
/// リクエストボディ（JSON）を検証し、正規化済みの`TodoDraft`を返す。
/// 作成・更新のどちらにも同じルールを適用する。
use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

use super::TodoStatus;

/// タイトルの最大文字数
pub const MAX_TITLE_LENGTH: usize = 200;

/// 説明の最大文字数
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

/// フィールド単位のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// フィールド名
    pub field: String,
    /// エラー理由
    pub reason: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// バリデーションエラー（1つ以上のフィールドエラーを保持）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", format_field_errors(.errors))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    /// 単一フィールドのエラーを作成
    pub fn single(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError::new(field, reason)],
        }
    }

    /// 指定フィールドのエラーが含まれているか
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// 検証済みのTodo入力
///
/// descriptionとstatusは未指定の場合None。
/// 作成時はデフォルト値を、更新時は既存値を使う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoDraft {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TodoStatus>,
}

/// Todo入力バリデータ
pub struct TodoValidator;

impl TodoValidator {
    /// リクエストボディを検証
    ///
    /// チェック内容:
    /// - ボディがJSONオブジェクトである
    /// - titleが文字列で、前後の空白除去後に1-200文字
    /// - descriptionが省略/null、または1000文字以下の文字列
    /// - statusが省略/null、またはpending/completed/archivedのいずれか
    ///
    /// すべてのフィールドを検査し、見つかったエラーをまとめて返す。
    pub fn validate(input: &Value) -> Result<TodoDraft, ValidationError> {
        let obj = input
            .as_object()
            .ok_or_else(|| ValidationError::single("body", "must be a JSON object"))?;

        let mut errors = Vec::new();

        let title = Self::validate_title(obj).map_err(|e| errors.push(e)).ok();
        let description = Self::validate_description(obj)
            .map_err(|e| errors.push(e))
            .ok()
            .flatten();
        let status = Self::validate_status(obj)
            .map_err(|e| errors.push(e))
            .ok()
            .flatten();

        match title {
            Some(title) if errors.is_empty() => Ok(TodoDraft {
                title,
                description,
                status,
            }),
            _ => Err(ValidationError { errors }),
        }
    }

    fn validate_title(obj: &Map<String, Value>) -> Result<String, FieldError> {
        let title = match obj.get("title") {
            None | Some(Value::Null) => return Err(FieldError::new("title", "is required")),
            Some(Value::String(s)) => s.trim(),
            Some(_) => return Err(FieldError::new("title", "must be a string")),
        };

        let len = title.chars().count();
        if len == 0 || len > MAX_TITLE_LENGTH {
            return Err(FieldError::new(
                "title",
                format!("must be between 1 and {} characters", MAX_TITLE_LENGTH),
            ));
        }

        Ok(title.to_string())
    }

    fn validate_description(obj: &Map<String, Value>) -> Result<Option<String>, FieldError> {
        let description = match obj.get("description") {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::String(s)) => s.trim(),
            Some(_) => return Err(FieldError::new("description", "must be a string")),
        };

        if description.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(FieldError::new(
                "description",
                format!("must be {} characters or less", MAX_DESCRIPTION_LENGTH),
            ));
        }

        Ok(Some(description.to_string()))
    }

    fn validate_status(obj: &Map<String, Value>) -> Result<Option<TodoStatus>, FieldError> {
        match obj.get("status") {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => s
                .parse::<TodoStatus>()
                .map(Some)
                .map_err(|_| FieldError::new("status", "must be one of: pending, completed, archived")),
            Some(_) => Err(FieldError::new("status", "must be a string")),
        }
    }
}
