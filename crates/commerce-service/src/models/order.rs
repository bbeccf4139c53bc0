//! 订单实体定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::catalog::Product;
use super::enums::OrderStatus;

/// 订单
///
/// 下单时一次性创建，之后不再修改或删除。
/// amount 是下单时刻的价格快照，而非对商品价格的实时引用。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub buyer_id: String,
    pub product_id: String,
    /// 驱动本次购买的推荐文章
    #[serde(rename = "blogId")]
    pub referral_id: String,
    pub amount: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// 按商品当前价格构造一笔已确认订单
    pub fn confirmed(
        buyer_id: &str,
        product: &Product,
        referral_id: &str,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            buyer_id: buyer_id.to_string(),
            product_id: product.id.clone(),
            referral_id: referral_id.to_string(),
            amount: product.price,
            status: OrderStatus::Confirmed,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmed_order_snapshots_price() {
        let now = Utc::now();
        let product = Product {
            id: "p-1".to_string(),
            name: "Soda Runner Low".to_string(),
            description: String::new(),
            price: 200,
            buyer_reward_points: 20,
            author_reward_points: 10,
            created_at: now,
        };

        let order = Order::confirmed("buyer-1", &product, "blog-1", now);
        assert_eq!(order.amount, 200);
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.product_id, "p-1");
        assert_eq!(order.referral_id, "blog-1");
        assert!(Uuid::parse_str(&order.id).is_ok());

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["blogId"], "blog-1");
        assert_eq!(json["status"], "CONFIRMED");
    }
}
