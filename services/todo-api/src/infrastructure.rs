// Infrastructure layer modules
pub mod config;
pub mod logging;
pub mod todo_repository;

// Re-exports
pub use config::{ConfigError, TodoTableConfig};
pub use logging::init_logging;
pub use todo_repository::{
    DynamoTodoRepository, PutCondition, TodoPage, TodoQuery, TodoRepository, TodoRepositoryError,
};
