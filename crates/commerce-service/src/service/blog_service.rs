//! 推荐文章服务
//!
//! 文章的增查是直通操作，不涉及结算；创建时校验关联商品存在

use std::sync::Arc;

use tracing::{info, instrument};

use super::dto::require_id;
use crate::error::{CommerceError, Result};
use crate::models::{Blog, NewBlog};
use crate::repository::{BlogRepositoryTrait, ProductRepositoryTrait};

pub struct BlogService {
    blogs: Arc<dyn BlogRepositoryTrait>,
    products: Arc<dyn ProductRepositoryTrait>,
}

impl BlogService {
    pub fn new(
        blogs: Arc<dyn BlogRepositoryTrait>,
        products: Arc<dyn ProductRepositoryTrait>,
    ) -> Self {
        Self { blogs, products }
    }

    #[instrument(skip(self, blog), fields(author_id = %blog.author_id, product_id = %blog.product_id))]
    pub async fn create_blog(&self, blog: NewBlog) -> Result<Blog> {
        if let Some(id) = blog.id.as_deref() {
            require_id("blog_id", id)?;
        }
        require_id("author_id", &blog.author_id)?;
        require_id("product_id", &blog.product_id)?;
        if blog.content.trim().is_empty() {
            return Err(CommerceError::Validation("content 不能为空".to_string()));
        }

        if self.products.get_product(&blog.product_id).await?.is_none() {
            return Err(CommerceError::ProductNotFound(blog.product_id));
        }

        let created = self.blogs.create_blog(&blog).await?;
        info!(blog_id = %created.id, "推荐文章已创建");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_blog(&self, id: &str) -> Result<Blog> {
        require_id("blog_id", id)?;
        self.blogs
            .get_blog(id)
            .await?
            .ok_or_else(|| CommerceError::BlogNotFound(id.to_string()))
    }

    pub async fn list_blogs(&self) -> Result<Vec<Blog>> {
        self.blogs.list_blogs().await
    }
}
