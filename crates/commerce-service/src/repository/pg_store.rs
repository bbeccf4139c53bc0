//! PostgreSQL 存储后端
//!
//! 把各实体仓储的事务内操作组合成结算引擎需要的能力，
//! 工作单元即一个 sqlx 事务，丢弃未提交的事务自动回滚。

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use super::blog_repo::BlogRepository;
use super::order_repo::OrderRepository;
use super::product_repo::ProductRepository;
use super::traits::{
    BlogRepositoryTrait, CommerceStore, OrderLedger, ProductReader, ProductRepositoryTrait,
    ReferralReader, TransactionManager, WalletLedger,
};
use super::wallet_repo::WalletRepository;
use crate::error::Result;
use crate::models::{Blog, Movement, NewBlog, NewProduct, Order, Product, Wallet};

pub struct PgStore {
    pool: PgPool,
    products: ProductRepository,
    blogs: BlogRepository,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            products: ProductRepository::new(pool.clone()),
            blogs: BlogRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl TransactionManager for PgStore {
    type Tx = Transaction<'static, Postgres>;

    async fn begin(&self) -> Result<Self::Tx> {
        Ok(self.pool.begin().await?)
    }

    async fn commit(&self, tx: Self::Tx) -> Result<()> {
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl ProductReader for PgStore {
    async fn get_product_in_tx(&self, tx: &mut Self::Tx, id: &str) -> Result<Option<Product>> {
        ProductRepository::get_product_in_tx(&mut **tx, id).await
    }
}

#[async_trait]
impl ReferralReader for PgStore {
    async fn get_blog_in_tx(&self, tx: &mut Self::Tx, id: &str) -> Result<Option<Blog>> {
        BlogRepository::get_blog_in_tx(&mut **tx, id).await
    }
}

#[async_trait]
impl OrderLedger for PgStore {
    async fn count_orders_by_buyer_and_product_in_tx(
        &self,
        tx: &mut Self::Tx,
        buyer_id: &str,
        product_id: &str,
    ) -> Result<i64> {
        OrderRepository::count_by_buyer_and_product_in_tx(&mut **tx, buyer_id, product_id).await
    }

    async fn create_order_in_tx(&self, tx: &mut Self::Tx, order: &Order) -> Result<()> {
        OrderRepository::create_in_tx(&mut **tx, order).await
    }

    async fn claim_first_purchase_in_tx(
        &self,
        tx: &mut Self::Tx,
        buyer_id: &str,
        product_id: &str,
        order_id: &str,
    ) -> Result<bool> {
        OrderRepository::claim_first_purchase_in_tx(&mut **tx, buyer_id, product_id, order_id)
            .await
    }
}

#[async_trait]
impl WalletLedger for PgStore {
    async fn get_wallet_in_tx(&self, tx: &mut Self::Tx, user_id: &str) -> Result<Option<Wallet>> {
        WalletRepository::get_in_tx(&mut **tx, user_id).await
    }

    async fn get_wallet_for_update_in_tx(
        &self,
        tx: &mut Self::Tx,
        user_id: &str,
    ) -> Result<Option<Wallet>> {
        WalletRepository::get_for_update_in_tx(&mut **tx, user_id).await
    }

    async fn get_or_create_wallet_in_tx(
        &self,
        tx: &mut Self::Tx,
        user_id: &str,
    ) -> Result<Wallet> {
        WalletRepository::get_or_create_in_tx(&mut **tx, user_id).await
    }

    async fn add_points_in_tx(
        &self,
        tx: &mut Self::Tx,
        user_id: &str,
        points: i64,
    ) -> Result<Wallet> {
        WalletRepository::add_points_in_tx(&mut **tx, user_id, points).await
    }

    async fn convert_points_to_balance_in_tx(
        &self,
        tx: &mut Self::Tx,
        user_id: &str,
        points_deducted: i64,
        balance_added: i64,
    ) -> Result<Option<Wallet>> {
        WalletRepository::convert_points_in_tx(&mut **tx, user_id, points_deducted, balance_added)
            .await
    }

    async fn create_movement_in_tx(&self, tx: &mut Self::Tx, movement: &Movement) -> Result<()> {
        WalletRepository::create_movement_in_tx(&mut **tx, movement).await
    }

    async fn list_movements_in_tx(
        &self,
        tx: &mut Self::Tx,
        user_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Movement>> {
        WalletRepository::list_movements_in_tx(&mut **tx, user_id, limit).await
    }
}

#[async_trait]
impl ProductRepositoryTrait for PgStore {
    async fn get_product(&self, id: &str) -> Result<Option<Product>> {
        self.products.get_product(id).await
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        self.products.list_products().await
    }

    async fn create_product(&self, id: &str, product: &NewProduct) -> Result<Product> {
        self.products.create_product(id, product).await
    }
}

#[async_trait]
impl BlogRepositoryTrait for PgStore {
    async fn get_blog(&self, id: &str) -> Result<Option<Blog>> {
        self.blogs.get_blog(id).await
    }

    async fn list_blogs(&self) -> Result<Vec<Blog>> {
        self.blogs.list_blogs().await
    }

    async fn create_blog(&self, blog: &NewBlog) -> Result<Blog> {
        self.blogs.create_blog(blog).await
    }
}

#[async_trait]
impl CommerceStore for PgStore {
    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
