//! 订单仓储
//!
//! 订单只在结算事务中写入，因此只提供事务内的操作

use sqlx::{PgConnection, Row};

use crate::error::Result;
use crate::models::Order;

pub struct OrderRepository;

impl OrderRepository {
    pub async fn count_by_buyer_and_product_in_tx(
        conn: &mut PgConnection,
        buyer_id: &str,
        product_id: &str,
    ) -> Result<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS cnt FROM orders WHERE buyer_id = $1 AND product_id = $2",
        )
        .bind(buyer_id)
        .bind(product_id)
        .fetch_one(conn)
        .await?;

        Ok(row.get("cnt"))
    }

    pub async fn create_in_tx(conn: &mut PgConnection, order: &Order) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, buyer_id, product_id, blog_id, amount, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&order.id)
        .bind(&order.buyer_id)
        .bind(&order.product_id)
        .bind(&order.referral_id)
        .bind(order.amount)
        .bind(order.status)
        .bind(order.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// 登记首购
    ///
    /// 主键 (buyer_id, product_id) 冲突时不插入，RETURNING 不返回行
    pub async fn claim_first_purchase_in_tx(
        conn: &mut PgConnection,
        buyer_id: &str,
        product_id: &str,
        order_id: &str,
    ) -> Result<bool> {
        let claimed = sqlx::query(
            r#"
            INSERT INTO first_purchase_claims (buyer_id, product_id, order_id, claimed_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (buyer_id, product_id) DO NOTHING
            RETURNING order_id
            "#,
        )
        .bind(buyer_id)
        .bind(product_id)
        .bind(order_id)
        .fetch_optional(conn)
        .await?;

        Ok(claimed.is_some())
    }
}
