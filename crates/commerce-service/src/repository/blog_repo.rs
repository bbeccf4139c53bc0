//! 推荐文章仓储

use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Blog, NewBlog};

pub struct BlogRepository {
    pool: PgPool,
}

impl BlogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_blog(&self, id: &str) -> Result<Option<Blog>> {
        let mut conn = self.pool.acquire().await?;
        Self::get_blog_in_tx(&mut conn, id).await
    }

    /// 在事务中读取推荐文章
    pub async fn get_blog_in_tx(conn: &mut PgConnection, id: &str) -> Result<Option<Blog>> {
        let blog = sqlx::query_as::<_, Blog>(
            r#"
            SELECT id, author_id, content, product_id AS linked_product_id, created_at
            FROM blogs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(blog)
    }

    pub async fn list_blogs(&self) -> Result<Vec<Blog>> {
        let blogs = sqlx::query_as::<_, Blog>(
            r#"
            SELECT id, author_id, content, product_id AS linked_product_id, created_at
            FROM blogs
            ORDER BY created_at DESC, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(blogs)
    }

    pub async fn create_blog(&self, blog: &NewBlog) -> Result<Blog> {
        let created = sqlx::query_as::<_, Blog>(
            r#"
            INSERT INTO blogs (id, author_id, content, product_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, author_id, content, product_id AS linked_product_id, created_at
            "#,
        )
        .bind(
            blog.id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
        )
        .bind(&blog.author_id)
        .bind(&blog.content)
        .bind(&blog.product_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }
}

