// アプリケーション層モジュール
pub mod health_handler;
pub mod todo_handler;

// 再エクスポート
pub use health_handler::{DatabaseState, HealthHandler, HealthReport, HealthStatus};
pub use todo_handler::{
    DeleteConfirmation, ListTodosParams, TodoHandler, TodoHandlerError, TodoListPage,
};
