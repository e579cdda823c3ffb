/// Todo CRUDハンドラー
///
/// 各エンドポイント（一覧・取得・作成・更新・削除）の処理を
/// バリデーション → リポジトリ操作 → レスポンス整形の順に実行する。
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::{
    ListLimit, PageKey, PageToken, PageTokenEncodeError, Timestamp, Todo, TodoStatus,
    TodoValidator, ValidationError,
};
use crate::infrastructure::{PutCondition, TodoQuery, TodoRepository, TodoRepositoryError};

/// Todoハンドラーのエラー型
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TodoHandlerError {
    /// 入力フィールドの検証エラー
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// リクエストボディが読めない
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// 指定IDのTodoが存在しない
    #[error("todo not found: {0}")]
    NotFound(String),

    /// ストア操作の失敗
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// レスポンス生成時の内部エラー
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<TodoRepositoryError> for TodoHandlerError {
    fn from(err: TodoRepositoryError) -> Self {
        match err {
            TodoRepositoryError::NotFound(todo_id) => TodoHandlerError::NotFound(todo_id),
            other => TodoHandlerError::StoreUnavailable(other.to_string()),
        }
    }
}

impl From<PageTokenEncodeError> for TodoHandlerError {
    fn from(err: PageTokenEncodeError) -> Self {
        TodoHandlerError::Internal(err.to_string())
    }
}

/// 一覧取得のクエリパラメータ（未加工）
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ListTodosParams {
    pub status: Option<String>,
    pub limit: Option<String>,
    pub next_token: Option<String>,
}

/// 一覧取得のレスポンス
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodoListPage {
    /// 取得したTodo
    pub todos: Vec<Todo>,
    /// 返却件数
    pub count: usize,
    /// このページで評価したアイテム数
    pub total_scanned: usize,
    /// 続きがある場合のトークン
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// 削除完了レスポンス
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteConfirmation {
    pub message: String,
}

/// Todo CRUDハンドラー
pub struct TodoHandler<R>
where
    R: TodoRepository,
{
    /// Todoリポジトリ
    repo: R,
}

impl<R> TodoHandler<R>
where
    R: TodoRepository,
{
    /// 新しいTodoHandlerを作成
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// リクエストボディのバイト列をJSONとして読む
    ///
    /// 空ボディは"No data provided"、壊れたJSONは"Invalid JSON"として扱う。
    pub fn parse_body(body: &[u8]) -> Result<Value, TodoHandlerError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(TodoHandlerError::InvalidRequest(
                "No data provided".to_string(),
            ));
        }

        serde_json::from_slice(body)
            .map_err(|e| TodoHandlerError::InvalidRequest(format!("Invalid JSON: {}", e)))
    }

    /// Todo一覧を取得
    ///
    /// # 処理フロー
    /// 1. statusを検証（不正値はValidationError）
    /// 2. limitを1-100に丸める
    /// 3. next_tokenをデコード（不正なトークンはカーソルなしとして扱う）
    /// 4. status指定時はGSIクエリ、未指定時はテーブルスキャン
    pub async fn list(&self, params: &ListTodosParams) -> Result<TodoListPage, TodoHandlerError> {
        let status = match params.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<TodoStatus>().map_err(|_| {
                ValidationError::single("status", "must be one of: pending, completed, archived")
            })?),
        };

        let limit = ListLimit::from_param(params.limit.as_deref());
        let start_key = Self::decode_next_token(params.next_token.as_deref(), status);

        let page = self
            .repo
            .query(&TodoQuery {
                status,
                limit: limit.get(),
                start_key,
            })
            .await?;

        let next_token = page
            .last_key
            .as_ref()
            .map(PageToken::encode)
            .transpose()?;

        info!(
            status = ?status,
            limit = limit.get(),
            count = page.items.len(),
            has_more = next_token.is_some(),
            "Todo一覧を取得"
        );

        Ok(TodoListPage {
            count: page.items.len(),
            total_scanned: page.scanned_count,
            todos: page.items,
            next_token,
        })
    }

    /// next_tokenを継続キーに変換
    ///
    /// デコードできない、または一覧条件に合わないトークンは無視する
    fn decode_next_token(token: Option<&str>, status: Option<TodoStatus>) -> Option<PageKey> {
        let token = token.map(str::trim).filter(|t| !t.is_empty())?;

        match PageToken::decode(token).and_then(|key| key.ensure_fits(status).map(|_| key)) {
            Ok(key) => Some(key),
            Err(err) => {
                warn!(error = %err, "不正なページネーショントークン、先頭から取得");
                None
            }
        }
    }

    /// IDでTodoを取得
    pub async fn get(&self, todo_id: &str) -> Result<Todo, TodoHandlerError> {
        let todo = self
            .repo
            .get(todo_id)
            .await?
            .ok_or_else(|| TodoHandlerError::NotFound(todo_id.to_string()))?;

        info!(todo_id = todo_id, "Todoを取得");
        Ok(todo)
    }

    /// Todoを作成
    ///
    /// バリデーションに失敗した場合はストアに触れずにエラーを返す。
    pub async fn create(&self, body: &Value) -> Result<Todo, TodoHandlerError> {
        let draft = TodoValidator::validate(body)?;
        let todo = Todo::create(draft, Timestamp::now());

        self.repo.put(&todo, PutCondition::MustNotExist).await?;

        info!(todo_id = %todo.todo_id, status = %todo.status, "Todoを作成");
        Ok(todo)
    }

    /// Todoを更新
    ///
    /// # 処理フロー
    /// 1. 入力を検証
    /// 2. 既存レコードを取得（なければNotFound）
    /// 3. 入力をマージしupdated_atを更新
    /// 4. 存在条件付きで書き込み（途中で削除された場合はNotFound）
    pub async fn update(&self, todo_id: &str, body: &Value) -> Result<Todo, TodoHandlerError> {
        let draft = TodoValidator::validate(body)?;

        let existing = self
            .repo
            .get(todo_id)
            .await?
            .ok_or_else(|| TodoHandlerError::NotFound(todo_id.to_string()))?;

        let updated = existing.merged(draft, Timestamp::now());
        self.repo.put(&updated, PutCondition::MustExist).await?;

        info!(todo_id = todo_id, status = %updated.status, "Todoを更新");
        Ok(updated)
    }

    /// Todoを削除
    pub async fn delete(&self, todo_id: &str) -> Result<DeleteConfirmation, TodoHandlerError> {
        if self.repo.get(todo_id).await?.is_none() {
            return Err(TodoHandlerError::NotFound(todo_id.to_string()));
        }

        self.repo.delete(todo_id).await?;

        info!(todo_id = todo_id, "Todoを削除");
        Ok(DeleteConfirmation {
            message: format!("Todo {} deleted successfully", todo_id),
        })
    }
}
