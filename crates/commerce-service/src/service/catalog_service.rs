//! 商品目录服务（只读路径 + 目录初始化）

use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::require_id;
use crate::error::{CommerceError, Result};
use crate::models::{NewProduct, Product};
use crate::repository::ProductRepositoryTrait;

pub struct CatalogService {
    products: Arc<dyn ProductRepositoryTrait>,
}

impl CatalogService {
    pub fn new(products: Arc<dyn ProductRepositoryTrait>) -> Self {
        Self { products }
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: &str) -> Result<Product> {
        require_id("product_id", id)?;
        self.products
            .get_product(id)
            .await?
            .ok_or_else(|| CommerceError::ProductNotFound(id.to_string()))
    }

    pub async fn list_products(&self) -> Result<Vec<Product>> {
        self.products.list_products().await
    }

    /// 创建商品
    ///
    /// 名称不能为空，价格和奖励积分不能为负；未指定 ID 时生成 UUID
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(&self, product: NewProduct) -> Result<Product> {
        if product.name.trim().is_empty() {
            return Err(CommerceError::Validation("name 不能为空".to_string()));
        }
        if product.price < 0 {
            return Err(CommerceError::Validation(format!(
                "price 不能为负: {}",
                product.price
            )));
        }
        if product.buyer_reward_points < 0 || product.author_reward_points < 0 {
            return Err(CommerceError::Validation("奖励积分不能为负".to_string()));
        }

        let id = match product.id.as_deref() {
            Some(id) => {
                require_id("product_id", id)?;
                id.to_string()
            }
            None => Uuid::new_v4().to_string(),
        };

        let created = self.products.create_product(&id, &product).await?;
        info!(product_id = %created.id, price = created.price, "商品已创建");
        Ok(created)
    }
}
