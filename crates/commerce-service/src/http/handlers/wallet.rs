//! 钱包 API 处理器

use axum::{
    Json,
    extract::{Path, Query, State},
    http::HeaderMap,
};

use super::requested_deadline;
use crate::http::{
    dto::{ApiResponse, ConvertRequest, MovementListParams},
    error::ApiError,
    state::AppState,
};
use crate::models::{LedgerReconciliation, Movement};
use crate::repository::CommerceStore;
use crate::service::{ConvertPointsRequest, WalletDto};

/// 查询钱包
///
/// GET /api/wallets/{user_id}
pub async fn get_wallet<S: CommerceStore>(
    State(state): State<AppState<S>>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<WalletDto>>, ApiError> {
    let wallet = state.finance.get_wallet(&user_id).await?;
    Ok(Json(ApiResponse::success(wallet.into())))
}

/// 积分兑换余额
///
/// POST /api/wallets/{user_id}/convert
pub async fn convert_points<S: CommerceStore>(
    State(state): State<AppState<S>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<ConvertRequest>,
) -> Result<Json<ApiResponse<WalletDto>>, ApiError> {
    let mut request = ConvertPointsRequest::new(user_id, req.points);
    if let Some(deadline) = requested_deadline(&headers)? {
        request = request.within(deadline);
    }
    let wallet = state.finance.convert_points(request).await?;
    Ok(Json(ApiResponse::success(wallet.into())))
}

/// 积分流水
///
/// GET /api/wallets/{user_id}/movements?limit=
pub async fn list_movements<S: CommerceStore>(
    State(state): State<AppState<S>>,
    Path(user_id): Path<String>,
    Query(params): Query<MovementListParams>,
) -> Result<Json<ApiResponse<Vec<Movement>>>, ApiError> {
    let movements = state
        .finance
        .list_movements(&user_id, params.limit)
        .await?;
    Ok(Json(ApiResponse::success(movements)))
}

/// 钱包对账
///
/// GET /api/wallets/{user_id}/reconciliation
pub async fn reconcile<S: CommerceStore>(
    State(state): State<AppState<S>>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<LedgerReconciliation>>, ApiError> {
    let report = state.finance.reconcile(&user_id).await?;
    Ok(Json(ApiResponse::success(report)))
}
