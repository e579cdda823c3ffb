//! HTTPルーティング
//!
//! LambdaとローカルサーバーはこのRouterを共有する。
//!
//! - GET    /health
//! - GET    /todos
//! - POST   /todos
//! - GET    /todos/{id}
//! - PUT    /todos/{id}
//! - DELETE /todos/{id}

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, warn};

use super::error::ApiError;
use crate::application::{
    DeleteConfirmation, HealthHandler, ListTodosParams, TodoHandler, TodoHandlerError,
    TodoListPage,
};
use crate::domain::Todo;
use crate::infrastructure::TodoRepository;

/// ルーター全体で共有される状態
pub struct AppState<R>
where
    R: TodoRepository,
{
    todos: Arc<TodoHandler<R>>,
    health: Arc<HealthHandler<R>>,
}

// R自体はCloneである必要がないため手動実装
impl<R> Clone for AppState<R>
where
    R: TodoRepository,
{
    fn clone(&self) -> Self {
        Self {
            todos: Arc::clone(&self.todos),
            health: Arc::clone(&self.health),
        }
    }
}

impl<R> AppState<R>
where
    R: TodoRepository + Clone,
{
    pub fn new(repo: R) -> Self {
        Self {
            todos: Arc::new(TodoHandler::new(repo.clone())),
            health: Arc::new(HealthHandler::new(repo)),
        }
    }
}

/// ルーターを構築する
///
/// TraceLayerでリクエスト/レスポンスを記録し、CORSは全オリジンを許可する。
/// 未定義のパスは`{"error": "Endpoint not found"}`の404を返す。
pub fn create_router<R>(repo: R) -> Router
where
    R: TodoRepository + Clone + 'static,
{
    Router::new()
        .route("/health", get(health::<R>))
        .route("/todos", get(list_todos::<R>).post(create_todo::<R>))
        .route(
            "/todos/{id}",
            get(get_todo::<R>)
                .put(update_todo::<R>)
                .delete(delete_todo::<R>),
        )
        .fallback(endpoint_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState::new(repo))
}

/// ハンドラーエラーをログに残してAPIエラーへ変換
fn reject(err: TodoHandlerError) -> ApiError {
    match &err {
        TodoHandlerError::StoreUnavailable(e) => error!(error = %e, "ストア操作に失敗"),
        TodoHandlerError::Internal(e) => error!(error = %e, "レスポンスの生成に失敗"),
        other => warn!(error = %other, "リクエストを拒否"),
    }
    ApiError::from(err)
}

/// ヘルスチェック (GET /health)
///
/// # Returns
/// - 200 OK: ストアに接続できた
/// - 500 Internal Server Error: ストアに接続できない
async fn health<R>(State(state): State<AppState<R>>) -> Response
where
    R: TodoRepository + 'static,
{
    let report = state.health.check().await;
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(report)).into_response()
}

/// Todo一覧 (GET /todos?status=&limit=&next_token=)
async fn list_todos<R>(
    State(state): State<AppState<R>>,
    params: Result<Query<ListTodosParams>, QueryRejection>,
) -> Result<Json<TodoListPage>, ApiError>
where
    R: TodoRepository + 'static,
{
    let Query(params) = params.map_err(|e| {
        warn!(error = %e, "クエリパラメータが不正");
        ApiError::bad_request("Invalid query parameters").with_details(e.body_text())
    })?;

    state.todos.list(&params).await.map(Json).map_err(reject)
}

/// Todo取得 (GET /todos/{id})
async fn get_todo<R>(
    State(state): State<AppState<R>>,
    Path(todo_id): Path<String>,
) -> Result<Json<Todo>, ApiError>
where
    R: TodoRepository + 'static,
{
    state.todos.get(&todo_id).await.map(Json).map_err(reject)
}

/// Todo作成 (POST /todos)
///
/// # Returns
/// - 201 Created: 作成したTodo
/// - 400 Bad Request: ボディが空・JSONが不正・バリデーションエラー
async fn create_todo<R>(
    State(state): State<AppState<R>>,
    body: Bytes,
) -> Result<(StatusCode, Json<Todo>), ApiError>
where
    R: TodoRepository + 'static,
{
    let input = TodoHandler::<R>::parse_body(&body).map_err(reject)?;
    let todo = state.todos.create(&input).await.map_err(reject)?;
    Ok((StatusCode::CREATED, Json(todo)))
}

/// Todo更新 (PUT /todos/{id})
async fn update_todo<R>(
    State(state): State<AppState<R>>,
    Path(todo_id): Path<String>,
    body: Bytes,
) -> Result<Json<Todo>, ApiError>
where
    R: TodoRepository + 'static,
{
    let input = TodoHandler::<R>::parse_body(&body).map_err(reject)?;
    state
        .todos
        .update(&todo_id, &input)
        .await
        .map(Json)
        .map_err(reject)
}

/// Todo削除 (DELETE /todos/{id})
async fn delete_todo<R>(
    State(state): State<AppState<R>>,
    Path(todo_id): Path<String>,
) -> Result<Json<DeleteConfirmation>, ApiError>
where
    R: TodoRepository + 'static,
{
    state.todos.delete(&todo_id).await.map(Json).map_err(reject)
}

/// 未定義のエンドポイント
async fn endpoint_not_found() -> ApiError {
    ApiError::not_found("Endpoint not found")
}
