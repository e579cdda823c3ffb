/// DynamoDBでTodoを管理するためのTodoリポジトリ
///
/// テーブル構成:
/// - パーティションキー: todo_id (S)
/// - GSI StatusDateIndex: status (S) + created_at (S)、射影はALL
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_dynamodb::types::AttributeValue;
use thiserror::Error;
use tracing::warn;

use crate::domain::{PageKey, Todo, TodoStatus};

use super::TodoTableConfig;

/// DynamoDBアイテムの型
type Item = HashMap<String, AttributeValue>;

/// リポジトリ操作のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TodoRepositoryError {
    /// 対象のTodoが存在しない（条件付き書き込み・削除の失敗）
    #[error("Todo not found: {0}")]
    NotFound(String),

    /// 同じIDのTodoが既に存在する
    #[error("Todo already exists: {0}")]
    Conflict(String),

    /// DynamoDBへの接続・操作に失敗
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// アイテムの変換に失敗
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// put時の存在条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutCondition {
    /// 新規作成: 同じIDが存在しない場合のみ書き込む
    MustNotExist,
    /// 置換: 同じIDが存在する場合のみ書き込む
    MustExist,
}

/// 一覧取得の条件
#[derive(Debug, Clone, PartialEq)]
pub struct TodoQuery {
    /// ステータスで絞り込む場合はStatusDateIndexを使う
    pub status: Option<TodoStatus>,
    /// 1ページの最大件数
    pub limit: u32,
    /// 前ページの継続キー
    pub start_key: Option<PageKey>,
}

/// 一覧取得の結果（1ページ分）
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TodoPage {
    /// 取得したTodo
    pub items: Vec<Todo>,
    /// このページで評価したアイテム数
    pub scanned_count: usize,
    /// 続きがある場合の継続キー
    pub last_key: Option<PageKey>,
}

/// Todo永続化用トレイト
///
/// 実際のDynamoDB実装とテスト用モックを差し替え可能にする。
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// IDでTodoを取得
    ///
    /// # 戻り値
    /// * 見つかった場合は`Ok(Some(Todo))`
    /// * 見つからなかった場合は`Ok(None)`
    async fn get(&self, todo_id: &str) -> Result<Option<Todo>, TodoRepositoryError>;

    /// Todoを書き込む
    ///
    /// # 戻り値
    /// * `MustNotExist`で既に存在した場合は`Err(Conflict)`
    /// * `MustExist`で存在しなかった場合は`Err(NotFound)`
    async fn put(&self, todo: &Todo, condition: PutCondition) -> Result<(), TodoRepositoryError>;

    /// Todoを1ページ分取得
    ///
    /// ステータス指定時はcreated_at昇順、未指定時はテーブルスキャン順。
    async fn query(&self, query: &TodoQuery) -> Result<TodoPage, TodoRepositoryError>;

    /// Todoを削除
    ///
    /// # 戻り値
    /// * 存在しなかった場合は`Err(NotFound)`
    async fn delete(&self, todo_id: &str) -> Result<(), TodoRepositoryError>;

    /// ストアへの疎通確認（状態は変更しない）
    async fn check_connection(&self) -> Result<(), TodoRepositoryError>;

    /// 対象テーブル名
    fn table_name(&self) -> &str;
}

/// TodoRepositoryのDynamoDB実装
#[derive(Debug, Clone)]
pub struct DynamoTodoRepository {
    /// DynamoDBクライアント
    client: DynamoDbClient,
    /// Todoテーブル名
    table_name: String,
    /// ステータス・作成日時のGSI名
    status_index: String,
}

impl DynamoTodoRepository {
    /// 新しいDynamoTodoRepositoryを作成
    ///
    /// # 引数
    /// * `client` - DynamoDBクライアント
    /// * `table_name` - Todoテーブルの名前
    /// * `status_index` - StatusDateIndexの名前
    pub fn new(client: DynamoDbClient, table_name: String, status_index: String) -> Self {
        Self {
            client,
            table_name,
            status_index,
        }
    }

    /// 設定からリポジトリを作成
    pub fn from_config(config: &TodoTableConfig) -> Self {
        Self::new(
            config.client().clone(),
            config.table_name().to_string(),
            config.status_index().to_string(),
        )
    }

    /// TodoをDynamoDBアイテムに変換
    fn todo_to_item(todo: &Todo) -> Result<Item, TodoRepositoryError> {
        serde_dynamo::to_item(todo)
            .map_err(|e| TodoRepositoryError::SerializationError(e.to_string()))
    }

    /// DynamoDBアイテムをTodoに変換
    fn item_to_todo(item: Item) -> Result<Todo, TodoRepositoryError> {
        serde_dynamo::from_item(item)
            .map_err(|e| TodoRepositoryError::SerializationError(e.to_string()))
    }

    /// 継続キーをExclusiveStartKeyに変換
    fn page_key_to_item(key: PageKey) -> Item {
        key.into_attributes()
            .into_iter()
            .map(|(name, value)| (name, AttributeValue::S(value)))
            .collect()
    }

    /// LastEvaluatedKeyを継続キーに変換
    ///
    /// キー属性はすべて文字列型なので、それ以外が来た場合はエラー
    fn item_to_page_key(item: Item) -> Result<PageKey, TodoRepositoryError> {
        let mut attributes = BTreeMap::new();
        for (name, value) in item {
            let value = value.as_s().map_err(|_| {
                TodoRepositoryError::SerializationError(format!(
                    "Key attribute {} is not a string",
                    name
                ))
            })?;
            attributes.insert(name, value.clone());
        }
        Ok(PageKey::new(attributes))
    }

    /// Query/Scanの結果をTodoPageに変換
    ///
    /// 変換できないアイテムはログを出してスキップする
    fn build_page(
        items: Option<Vec<Item>>,
        scanned_count: i32,
        last_evaluated_key: Option<Item>,
    ) -> Result<TodoPage, TodoRepositoryError> {
        let mut todos = Vec::new();
        for item in items.unwrap_or_default() {
            match Self::item_to_todo(item) {
                Ok(todo) => todos.push(todo),
                Err(e) => {
                    warn!(error = %e, "Todoアイテムの変換に失敗、スキップ");
                }
            }
        }

        let last_key = last_evaluated_key
            .filter(|key| !key.is_empty())
            .map(Self::item_to_page_key)
            .transpose()?;

        Ok(TodoPage {
            items: todos,
            scanned_count: scanned_count.max(0) as usize,
            last_key,
        })
    }
}

#[async_trait]
impl TodoRepository for DynamoTodoRepository {
    async fn get(&self, todo_id: &str) -> Result<Option<Todo>, TodoRepositoryError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("todo_id", AttributeValue::S(todo_id.to_string()))
            .send()
            .await
            .map_err(|e| TodoRepositoryError::Unavailable(e.into_service_error().to_string()))?;

        result.item.map(Self::item_to_todo).transpose()
    }

    async fn put(&self, todo: &Todo, condition: PutCondition) -> Result<(), TodoRepositoryError> {
        let item = Self::todo_to_item(todo)?;

        let condition_expression = match condition {
            PutCondition::MustNotExist => "attribute_not_exists(todo_id)",
            PutCondition::MustExist => "attribute_exists(todo_id)",
        };

        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression(condition_expression)
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) => {
                let service_error = err.into_service_error();
                if service_error.is_conditional_check_failed_exception() {
                    return Err(match condition {
                        PutCondition::MustNotExist => {
                            TodoRepositoryError::Conflict(todo.todo_id.clone())
                        }
                        PutCondition::MustExist => {
                            TodoRepositoryError::NotFound(todo.todo_id.clone())
                        }
                    });
                }
                Err(TodoRepositoryError::Unavailable(service_error.to_string()))
            }
        }
    }

    async fn query(&self, query: &TodoQuery) -> Result<TodoPage, TodoRepositoryError> {
        let start_key = query.start_key.clone().map(Self::page_key_to_item);
        let limit = query.limit.max(1) as i32;

        match query.status {
            Some(status) => {
                // statusはDynamoDBの予約語のため属性名プレースホルダーを使う
                let output = self
                    .client
                    .query()
                    .table_name(&self.table_name)
                    .index_name(&self.status_index)
                    .key_condition_expression("#status = :status")
                    .expression_attribute_names("#status", "status")
                    .expression_attribute_values(
                        ":status",
                        AttributeValue::S(status.as_str().to_string()),
                    )
                    .limit(limit)
                    .set_exclusive_start_key(start_key)
                    .send()
                    .await
                    .map_err(|e| {
                        TodoRepositoryError::Unavailable(e.into_service_error().to_string())
                    })?;

                let scanned_count = output.scanned_count();
                Self::build_page(output.items, scanned_count, output.last_evaluated_key)
            }
            None => {
                let output = self
                    .client
                    .scan()
                    .table_name(&self.table_name)
                    .limit(limit)
                    .set_exclusive_start_key(start_key)
                    .send()
                    .await
                    .map_err(|e| {
                        TodoRepositoryError::Unavailable(e.into_service_error().to_string())
                    })?;

                let scanned_count = output.scanned_count();
                Self::build_page(output.items, scanned_count, output.last_evaluated_key)
            }
        }
    }

    async fn delete(&self, todo_id: &str) -> Result<(), TodoRepositoryError> {
        let result = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .key("todo_id", AttributeValue::S(todo_id.to_string()))
            .condition_expression("attribute_exists(todo_id)")
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) => {
                let service_error = err.into_service_error();
                if service_error.is_conditional_check_failed_exception() {
                    return Err(TodoRepositoryError::NotFound(todo_id.to_string()));
                }
                Err(TodoRepositoryError::Unavailable(service_error.to_string()))
            }
        }
    }

    async fn check_connection(&self) -> Result<(), TodoRepositoryError> {
        self.client
            .describe_table()
            .table_name(&self.table_name)
            .send()
            .await
            .map_err(|e| TodoRepositoryError::Unavailable(e.into_service_error().to_string()))?;

        Ok(())
    }

    fn table_name(&self) -> &str {
        &self.table_name
    }
}
