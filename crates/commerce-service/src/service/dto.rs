//! 服务层数据传输对象

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CommerceError, Result};
use crate::models::Wallet;

/// 下单请求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub buyer_id: String,
    pub product_id: String,
    pub blog_id: String,
    /// 调用方要求的截止时间，不超过服务配置的上限
    #[serde(skip)]
    pub deadline: Option<Duration>,
}

impl PlaceOrderRequest {
    pub fn new(
        buyer_id: impl Into<String>,
        product_id: impl Into<String>,
        blog_id: impl Into<String>,
    ) -> Self {
        Self {
            buyer_id: buyer_id.into(),
            product_id: product_id.into(),
            blog_id: blog_id.into(),
            deadline: None,
        }
    }

    pub fn within(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn validate(&self) -> Result<()> {
        require_id("buyer_id", &self.buyer_id)?;
        require_id("product_id", &self.product_id)?;
        require_id("blog_id", &self.blog_id)
    }
}

/// 积分兑换请求
///
/// points <= 0 表示兑换全部持有积分
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertPointsRequest {
    pub user_id: String,
    pub points: i64,
    #[serde(skip)]
    pub deadline: Option<Duration>,
}

impl ConvertPointsRequest {
    pub fn new(user_id: impl Into<String>, points: i64) -> Self {
        Self {
            user_id: user_id.into(),
            points,
            deadline: None,
        }
    }

    pub fn within(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// 解析本次实际要兑换的积分
    pub fn resolve_amount(&self, held: i64) -> i64 {
        if self.points <= 0 { held } else { self.points }
    }
}

/// 钱包视图
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletDto {
    pub user_id: String,
    pub points: i64,
    pub balance: i64,
}

impl From<Wallet> for WalletDto {
    fn from(wallet: Wallet) -> Self {
        Self {
            user_id: wallet.user_id,
            points: wallet.points,
            balance: wallet.balance,
        }
    }
}

/// 标识符必须非空
pub(crate) fn require_id(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CommerceError::Validation(format!("{field} 不能为空")));
    }
    Ok(())
}
