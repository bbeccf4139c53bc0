//! 商品目录 API 处理器

use axum::{
    Json,
    extract::{Path, State},
};

use crate::http::{dto::ApiResponse, error::ApiError, state::AppState};
use crate::models::Product;
use crate::repository::CommerceStore;

/// 商品列表
///
/// GET /api/products
pub async fn list_products<S: CommerceStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<ApiResponse<Vec<Product>>>, ApiError> {
    let products = state.catalog.list_products().await?;
    Ok(Json(ApiResponse::success(products)))
}

/// 商品详情
///
/// GET /api/products/{id}
pub async fn get_product<S: CommerceStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let product = state.catalog.get_product(&id).await?;
    Ok(Json(ApiResponse::success(product)))
}
