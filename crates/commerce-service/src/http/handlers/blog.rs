//! 推荐文章 API 处理器

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::http::{
    dto::{ApiResponse, CreateBlogRequest},
    error::ApiError,
    state::AppState,
};
use crate::models::{Blog, NewBlog};
use crate::repository::CommerceStore;

/// 创建推荐文章
///
/// POST /api/blogs
pub async fn create_blog<S: CommerceStore>(
    State(state): State<AppState<S>>,
    Json(req): Json<CreateBlogRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Blog>>), ApiError> {
    req.validate()?;

    let blog = state
        .blogs
        .create_blog(NewBlog {
            id: None,
            author_id: req.author_id,
            content: req.content,
            product_id: req.product_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(blog))))
}

/// 文章列表
///
/// GET /api/blogs
pub async fn list_blogs<S: CommerceStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<ApiResponse<Vec<Blog>>>, ApiError> {
    let blogs = state.blogs.list_blogs().await?;
    Ok(Json(ApiResponse::success(blogs)))
}

/// 文章详情
///
/// GET /api/blogs/{id}
pub async fn get_blog<S: CommerceStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Blog>>, ApiError> {
    let blog = state.blogs.get_blog(&id).await?;
    Ok(Json(ApiResponse::success(blog)))
}
