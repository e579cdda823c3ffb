//! APIエラーハンドリング
//!
//! すべてのエラーは`{"error": ..., "details"?: ...}`形式のJSONで返却する。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::application::TodoHandlerError;

/// APIエラーレスポンスのボディ
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiErrorBody {
    /// エラーの概要
    pub error: String,
    /// 詳細（フィールドエラーの一覧やストアのエラー内容）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// APIエラー
///
/// ステータスコードとJSON形式のエラーボディを持つ。
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    body: ApiErrorBody,
}

impl ApiError {
    /// 新しいApiErrorを作成
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiErrorBody {
                error: error.into(),
                details: None,
            },
        }
    }

    /// 詳細を付与
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.body.details = Some(details.into());
        self
    }

    /// 400 Bad Request
    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    /// 404 Not Found
    pub fn not_found(error: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, error)
    }

    /// 500 Internal Server Error
    pub fn internal_error(error: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }

    pub fn error(&self) -> &str {
        &self.body.error
    }

    pub fn details(&self) -> Option<&str> {
        self.body.details.as_deref()
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<TodoHandlerError> for ApiError {
    fn from(err: TodoHandlerError) -> Self {
        match err {
            TodoHandlerError::Validation(e) => {
                ApiError::bad_request("Validation failed").with_details(e.to_string())
            }
            TodoHandlerError::InvalidRequest(msg) => ApiError::bad_request(msg),
            TodoHandlerError::NotFound(_) => ApiError::not_found("Todo not found"),
            TodoHandlerError::StoreUnavailable(msg) | TodoHandlerError::Internal(msg) => {
                ApiError::internal_error("Internal server error").with_details(msg)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ValidationError;
    use axum::Router;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::get;
    use tower::ServiceExt;

    #[test]
    fn test_api_error_creation() {
        let error = ApiError::new(StatusCode::BAD_REQUEST, "Invalid input").with_details("title");
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error.error(), "Invalid input");
        assert_eq!(error.details(), Some("title"));
    }

    #[test]
    fn test_validation_error_mapping() {
        let err = TodoHandlerError::Validation(ValidationError::single(
            "title",
            "must be between 1 and 200 characters",
        ));
        let api_error = ApiError::from(err);

        assert_eq!(api_error.status(), StatusCode::BAD_REQUEST);
        assert_eq!(api_error.error(), "Validation failed");
        assert_eq!(
            api_error.details(),
            Some("title: must be between 1 and 200 characters")
        );
    }

    #[test]
    fn test_handler_error_mapping() {
        let api_error = ApiError::from(TodoHandlerError::InvalidRequest(
            "No data provided".to_string(),
        ));
        assert_eq!(api_error.status(), StatusCode::BAD_REQUEST);
        assert_eq!(api_error.error(), "No data provided");
        assert_eq!(api_error.details(), None);

        let api_error = ApiError::from(TodoHandlerError::NotFound("abc".to_string()));
        assert_eq!(api_error.status(), StatusCode::NOT_FOUND);
        assert_eq!(api_error.error(), "Todo not found");

        let api_error = ApiError::from(TodoHandlerError::StoreUnavailable("throttled".to_string()));
        assert_eq!(api_error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_error.details(), Some("throttled"));

        let api_error = ApiError::from(TodoHandlerError::Internal("encode".to_string()));
        assert_eq!(api_error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_error.error(), "Internal server error");
    }

    #[test]
    fn test_api_error_body_omits_missing_details() {
        let body = ApiErrorBody {
            error: "Todo not found".to_string(),
            details: None,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"error":"Todo not found"}"#
        );
    }

    #[tokio::test]
    async fn test_api_error_into_response() {
        async fn error_handler() -> ApiError {
            ApiError::internal_error("Internal server error").with_details("down")
        }

        let app = Router::new().route("/error", get(error_handler));
        let request = Request::builder()
            .uri("/error")
            .method("GET")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error_body: ApiErrorBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(error_body.error, "Internal server error");
        assert_eq!(error_body.details.as_deref(), Some("down"));
    }
}
