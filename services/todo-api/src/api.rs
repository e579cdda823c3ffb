// HTTP層モジュール
pub mod error;
pub mod router;

// 再エクスポート
pub use error::{ApiError, ApiErrorBody};
pub use router::{AppState, create_router};
