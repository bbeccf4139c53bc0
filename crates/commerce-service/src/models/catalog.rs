//! 商品目录实体定义
//!
//! 包含商品与推荐文章（blog），二者在结算范围内只读

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 商品
///
/// 价格以最小货币单位存储，奖励积分在创建后不可变
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    /// 价格（最小货币单位）
    pub price: i64,
    /// 买家首购奖励积分
    pub buyer_reward_points: i32,
    /// 作者每单奖励积分
    pub author_reward_points: i32,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// 买家首购奖励（i64，便于直接记账）
    pub fn buyer_reward(&self) -> i64 {
        i64::from(self.buyer_reward_points)
    }

    /// 作者推荐奖励
    pub fn author_reward(&self) -> i64 {
        i64::from(self.author_reward_points)
    }
}

/// 新建商品参数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    /// 为空时由服务端生成
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub buyer_reward_points: i32,
    pub author_reward_points: i32,
}

/// 推荐文章
///
/// 作者通过文章推荐商品，文章驱动的每一笔订单都会给作者记奖励
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    pub id: String,
    pub author_id: String,
    pub content: String,
    pub linked_product_id: String,
    pub created_at: DateTime<Utc>,
}

/// 新建文章参数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBlog {
    /// 为空时由服务端生成
    pub id: Option<String>,
    pub author_id: String,
    pub content: String,
    pub product_id: String,
}
