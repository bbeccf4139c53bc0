//! 下单 API 处理器

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use validator::Validate;

use super::requested_deadline;
use crate::http::{
    dto::{ApiResponse, CreateOrderRequest},
    error::ApiError,
    state::AppState,
};
use crate::models::Order;
use crate::repository::CommerceStore;
use crate::service::PlaceOrderRequest;

/// 下单并结算奖励
///
/// POST /api/orders
///
/// 可选请求头 `x-request-timeout-ms` 缩短本次结算的截止时间
pub async fn place_order<S: CommerceStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Order>>), ApiError> {
    req.validate()?;

    let mut request = PlaceOrderRequest::new(req.buyer_id, req.product_id, req.blog_id);
    if let Some(deadline) = requested_deadline(&headers)? {
        request = request.within(deadline);
    }
    let order = state.orders.place_order(request).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(order))))
}
