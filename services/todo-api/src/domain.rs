// Domain layer modules
pub mod list_limit;
pub mod page_token;
pub mod timestamp;
pub mod todo;
pub mod todo_status;
pub mod todo_validator;

// Re-exports
pub use list_limit::{ListLimit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
pub use page_token::{InvalidPageToken, PageKey, PageToken, PageTokenEncodeError};
pub use timestamp::Timestamp;
pub use todo::Todo;
pub use todo_status::{TodoStatus, TodoStatusError};
pub use todo_validator::{
    FieldError, TodoDraft, TodoValidator, ValidationError, MAX_DESCRIPTION_LENGTH,
    MAX_TITLE_LENGTH,
};
