//! 商品仓储
//!
//! 商品在结算范围内只读，写入仅用于初始化目录

use chrono::Utc;
use sqlx::{PgConnection, PgPool};

use crate::error::Result;
use crate::models::{NewProduct, Product};

pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_product(&self, id: &str) -> Result<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        Self::get_product_in_tx(&mut conn, id).await
    }

    /// 在事务中读取商品
    pub async fn get_product_in_tx(conn: &mut PgConnection, id: &str) -> Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price, buyer_reward_points,
                   author_reward_points, created_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(product)
    }

    pub async fn list_products(&self) -> Result<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price, buyer_reward_points,
                   author_reward_points, created_at
            FROM products
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    pub async fn create_product(&self, id: &str, product: &NewProduct) -> Result<Product> {
        let created = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (id, name, description, price, buyer_reward_points,
                                  author_reward_points, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, description, price, buyer_reward_points,
                      author_reward_points, created_at
            "#,
        )
        .bind(id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.buyer_reward_points)
        .bind(product.author_reward_points)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }
}

