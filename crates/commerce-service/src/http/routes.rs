//! 路由配置模块
//!
//! 定义所有 REST API 端点的路由映射

use axum::{
    Router, middleware,
    routing::{get, post},
};
use referral_shared::observability::middleware as obs_middleware;

use super::{handlers, state::AppState};
use crate::repository::CommerceStore;

/// 商品与推荐文章路由
fn catalog_routes<S: CommerceStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/products", get(handlers::catalog::list_products::<S>))
        .route("/products/{id}", get(handlers::catalog::get_product::<S>))
        .route(
            "/blogs",
            get(handlers::blog::list_blogs::<S>).post(handlers::blog::create_blog::<S>),
        )
        .route("/blogs/{id}", get(handlers::blog::get_blog::<S>))
}

/// 结算与钱包路由
fn settlement_routes<S: CommerceStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/orders", post(handlers::order::place_order::<S>))
        .route("/wallets/{user_id}", get(handlers::wallet::get_wallet::<S>))
        .route(
            "/wallets/{user_id}/convert",
            post(handlers::wallet::convert_points::<S>),
        )
        .route(
            "/wallets/{user_id}/movements",
            get(handlers::wallet::list_movements::<S>),
        )
        .route(
            "/wallets/{user_id}/reconciliation",
            get(handlers::wallet::reconcile::<S>),
        )
}

/// 构建 /api 下的全部路由
pub fn api_routes<S: CommerceStore>() -> Router<AppState<S>> {
    Router::new()
        .merge(catalog_routes())
        .merge(settlement_routes())
}

/// 构建完整应用
///
/// 中间件顺序：request_id 最外层，保证追踪中间件能读到请求 ID
pub fn app<S: CommerceStore>(state: AppState<S>) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .route("/health", get(handlers::health::<S>))
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .with_state(state)
}
