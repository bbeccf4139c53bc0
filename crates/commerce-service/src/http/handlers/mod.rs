//! API 处理器

pub mod blog;
pub mod catalog;
pub mod order;
pub mod wallet;

use std::time::Duration;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde_json::{Value, json};

use super::{error::ApiError, state::AppState};
use crate::error::CommerceError;
use crate::repository::CommerceStore;

/// 调用方截止时间请求头，单位毫秒
pub const REQUEST_TIMEOUT_HEADER: &str = "x-request-timeout-ms";

/// 读取调用方截止时间，未携带时返回 None
fn requested_deadline(headers: &HeaderMap) -> Result<Option<Duration>, ApiError> {
    let Some(value) = headers.get(REQUEST_TIMEOUT_HEADER) else {
        return Ok(None);
    };

    let millis = value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .ok_or_else(|| {
            CommerceError::Validation(format!("{REQUEST_TIMEOUT_HEADER} 必须是正整数毫秒"))
        })?;

    Ok(Some(Duration::from_millis(millis)))
}

/// 健康检查：存储不可用时返回 503
///
/// GET /health
pub async fn health<S: CommerceStore>(State(state): State<AppState<S>>) -> (StatusCode, Json<Value>) {
    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "storage": "ok" })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "存储健康检查失败");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "storage": "fail" })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_TIMEOUT_HEADER, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_requested_deadline() {
        assert_eq!(requested_deadline(&HeaderMap::new()).unwrap(), None);
        assert_eq!(
            requested_deadline(&headers("250")).unwrap(),
            Some(Duration::from_millis(250))
        );

        for bad in ["0", "-1", "soon"] {
            let err = requested_deadline(&headers(bad)).unwrap_err();
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST, "{bad}");
        }
    }
}
