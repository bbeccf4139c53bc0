//! HTTP 错误映射
//!
//! 只按错误类别决定状态码；存储和内部错误只返回通用提示，详细信息记录日志

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::{CommerceError, ErrorKind};

/// 传输层错误
#[derive(Debug)]
pub struct ApiError(pub CommerceError);

impl ApiError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::ValidationFailed => StatusCode::BAD_REQUEST,
            ErrorKind::InsufficientPoints | ErrorKind::ConflictOrTransient => StatusCode::CONFLICT,
            ErrorKind::Cancelled => StatusCode::GATEWAY_TIMEOUT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CommerceError> for ApiError {
    fn from(err: CommerceError) -> Self {
        Self(err)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self(CommerceError::Validation(errors.to_string()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match &self.0 {
            CommerceError::Database(e) => {
                tracing::error!(error = %e, "数据库操作失败");
                "服务繁忙，请稍后重试".to_string()
            }
            CommerceError::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.0.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}
