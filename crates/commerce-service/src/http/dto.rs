//! HTTP 请求与响应 DTO

use serde::{Deserialize, Serialize};
use validator::Validate;

/// API 统一响应
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: "操作成功".to_string(),
            data: Some(data),
        }
    }
}

/// 下单请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, max = 128, message = "buyerId 长度必须在1-128个字符之间"))]
    pub buyer_id: String,
    #[validate(length(min = 1, max = 128, message = "productId 长度必须在1-128个字符之间"))]
    pub product_id: String,
    #[validate(length(min = 1, max = 128, message = "blogId 长度必须在1-128个字符之间"))]
    pub blog_id: String,
}

/// 积分兑换请求
///
/// points 缺省或 <= 0 时兑换全部积分
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest {
    #[serde(default)]
    pub points: i64,
}

/// 创建推荐文章请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlogRequest {
    #[validate(length(min = 1, max = 128, message = "authorId 长度必须在1-128个字符之间"))]
    pub author_id: String,
    #[validate(length(min = 1, max = 10000, message = "content 长度必须在1-10000个字符之间"))]
    pub content: String,
    #[validate(length(min = 1, max = 128, message = "productId 长度必须在1-128个字符之间"))]
    pub product_id: String,
}

/// 流水查询参数
#[derive(Debug, Default, Deserialize)]
pub struct MovementListParams {
    pub limit: Option<i64>,
}
