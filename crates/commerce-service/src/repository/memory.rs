//! 进程内存储后端
//!
//! 用于本地演示（`storage.backend = "memory"`）和测试。
//! 工作单元持有全局互斥锁并在状态副本上读写，提交时整体写回，
//! 丢弃则副本作废。所有工作单元因此串行执行。
//!
//! 测试可以通过 [`FailPoint`] 在指定步骤注入故障，验证回滚语义。

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::traits::{
    BlogRepositoryTrait, CommerceStore, OrderLedger, ProductReader, ProductRepositoryTrait,
    ReferralReader, TransactionManager, WalletLedger,
};
use crate::error::{CommerceError, Result};
use crate::models::{Blog, Movement, NewBlog, NewProduct, Order, Product, Wallet};

/// 故障注入点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    CreateOrder,
    AddPoints,
    ConvertPoints,
    CreateMovement,
    Commit,
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    products: HashMap<String, Product>,
    blogs: HashMap<String, Blog>,
    orders: Vec<Order>,
    wallets: HashMap<String, Wallet>,
    movements: Vec<Movement>,
    first_purchase_claims: HashMap<(String, String), String>,
}

/// 内存工作单元
pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
    fail_points: Arc<parking_lot::Mutex<HashSet<FailPoint>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 在指定步骤注入故障，直到 [`Self::clear_failure`] 被调用
    pub fn fail_at(&self, point: FailPoint) {
        self.fail_points.lock().insert(point);
    }

    pub fn clear_failure(&self, point: FailPoint) {
        self.fail_points.lock().remove(&point);
    }

    fn check(&self, point: FailPoint) -> Result<()> {
        if self.fail_points.lock().contains(&point) {
            return Err(CommerceError::Internal(format!("注入故障: {point:?}")));
        }
        Ok(())
    }

    // ==================== 测试数据 ====================

    pub async fn insert_product(&self, product: Product) {
        let mut state = self.state.lock().await;
        state.products.insert(product.id.clone(), product);
    }

    pub async fn insert_blog(&self, blog: Blog) {
        let mut state = self.state.lock().await;
        state.blogs.insert(blog.id.clone(), blog);
    }

    pub async fn insert_wallet(&self, wallet: Wallet) {
        let mut state = self.state.lock().await;
        state.wallets.insert(wallet.user_id.clone(), wallet);
    }

    /// 已提交的全部订单
    pub async fn orders(&self) -> Vec<Order> {
        self.state.lock().await.orders.clone()
    }

    /// 已提交的某用户流水（按写入顺序）
    pub async fn movements_of(&self, user_id: &str) -> Vec<Movement> {
        self.state
            .lock()
            .await
            .movements
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect()
    }

    /// 已提交的钱包
    pub async fn wallet(&self, user_id: &str) -> Option<Wallet> {
        self.state.lock().await.wallets.get(user_id).cloned()
    }
}

#[async_trait]
impl TransactionManager for InMemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<Self::Tx> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(MemoryTx { guard, working })
    }

    async fn commit(&self, tx: Self::Tx) -> Result<()> {
        self.check(FailPoint::Commit)?;
        let MemoryTx { mut guard, working } = tx;
        *guard = working;
        Ok(())
    }
}

#[async_trait]
impl ProductReader for InMemoryStore {
    async fn get_product_in_tx(&self, tx: &mut Self::Tx, id: &str) -> Result<Option<Product>> {
        Ok(tx.working.products.get(id).cloned())
    }
}

#[async_trait]
impl ReferralReader for InMemoryStore {
    async fn get_blog_in_tx(&self, tx: &mut Self::Tx, id: &str) -> Result<Option<Blog>> {
        Ok(tx.working.blogs.get(id).cloned())
    }
}

#[async_trait]
impl OrderLedger for InMemoryStore {
    async fn count_orders_by_buyer_and_product_in_tx(
        &self,
        tx: &mut Self::Tx,
        buyer_id: &str,
        product_id: &str,
    ) -> Result<i64> {
        let count = tx
            .working
            .orders
            .iter()
            .filter(|o| o.buyer_id == buyer_id && o.product_id == product_id)
            .count();
        Ok(count as i64)
    }

    async fn create_order_in_tx(&self, tx: &mut Self::Tx, order: &Order) -> Result<()> {
        self.check(FailPoint::CreateOrder)?;
        tx.working.orders.push(order.clone());
        Ok(())
    }

    async fn claim_first_purchase_in_tx(
        &self,
        tx: &mut Self::Tx,
        buyer_id: &str,
        product_id: &str,
        order_id: &str,
    ) -> Result<bool> {
        let key = (buyer_id.to_string(), product_id.to_string());
        if tx.working.first_purchase_claims.contains_key(&key) {
            return Ok(false);
        }
        tx.working
            .first_purchase_claims
            .insert(key, order_id.to_string());
        Ok(true)
    }
}

#[async_trait]
impl WalletLedger for InMemoryStore {
    async fn get_wallet_in_tx(&self, tx: &mut Self::Tx, user_id: &str) -> Result<Option<Wallet>> {
        Ok(tx.working.wallets.get(user_id).cloned())
    }

    async fn get_wallet_for_update_in_tx(
        &self,
        tx: &mut Self::Tx,
        user_id: &str,
    ) -> Result<Option<Wallet>> {
        // 工作单元本身已独占全部状态
        self.get_wallet_in_tx(tx, user_id).await
    }

    async fn get_or_create_wallet_in_tx(
        &self,
        tx: &mut Self::Tx,
        user_id: &str,
    ) -> Result<Wallet> {
        let wallet = tx
            .working
            .wallets
            .entry(user_id.to_string())
            .or_insert_with(|| Wallet::empty(user_id, Utc::now()));
        Ok(wallet.clone())
    }

    async fn add_points_in_tx(
        &self,
        tx: &mut Self::Tx,
        user_id: &str,
        points: i64,
    ) -> Result<Wallet> {
        self.check(FailPoint::AddPoints)?;
        let wallet = tx
            .working
            .wallets
            .get_mut(user_id)
            .ok_or_else(|| CommerceError::WalletNotFound(user_id.to_string()))?;
        wallet.points += points;
        wallet.updated_at = Utc::now();
        Ok(wallet.clone())
    }

    async fn convert_points_to_balance_in_tx(
        &self,
        tx: &mut Self::Tx,
        user_id: &str,
        points_deducted: i64,
        balance_added: i64,
    ) -> Result<Option<Wallet>> {
        self.check(FailPoint::ConvertPoints)?;
        let Some(wallet) = tx.working.wallets.get_mut(user_id) else {
            return Ok(None);
        };
        if wallet.points < points_deducted {
            return Ok(None);
        }
        wallet.points -= points_deducted;
        wallet.balance += balance_added;
        wallet.updated_at = Utc::now();
        Ok(Some(wallet.clone()))
    }

    async fn create_movement_in_tx(&self, tx: &mut Self::Tx, movement: &Movement) -> Result<()> {
        self.check(FailPoint::CreateMovement)?;
        tx.working.movements.push(movement.clone());
        Ok(())
    }

    async fn list_movements_in_tx(
        &self,
        tx: &mut Self::Tx,
        user_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Movement>> {
        let take = limit.map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(0));
        Ok(tx
            .working
            .movements
            .iter()
            .rev()
            .filter(|m| m.user_id == user_id)
            .take(take)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ProductRepositoryTrait for InMemoryStore {
    async fn get_product(&self, id: &str) -> Result<Option<Product>> {
        Ok(self.state.lock().await.products.get(id).cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let mut products: Vec<Product> =
            self.state.lock().await.products.values().cloned().collect();
        products.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(products)
    }

    async fn create_product(&self, id: &str, product: &NewProduct) -> Result<Product> {
        let mut state = self.state.lock().await;
        if state.products.contains_key(id) {
            return Err(CommerceError::Validation(format!("商品已存在: {id}")));
        }
        let created = Product {
            id: id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            buyer_reward_points: product.buyer_reward_points,
            author_reward_points: product.author_reward_points,
            created_at: Utc::now(),
        };
        state.products.insert(created.id.clone(), created.clone());
        Ok(created)
    }
}

#[async_trait]
impl BlogRepositoryTrait for InMemoryStore {
    async fn get_blog(&self, id: &str) -> Result<Option<Blog>> {
        Ok(self.state.lock().await.blogs.get(id).cloned())
    }

    async fn list_blogs(&self) -> Result<Vec<Blog>> {
        let mut blogs: Vec<Blog> = self.state.lock().await.blogs.values().cloned().collect();
        blogs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(blogs)
    }

    async fn create_blog(&self, blog: &NewBlog) -> Result<Blog> {
        let created = Blog {
            id: blog
                .id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            author_id: blog.author_id.clone(),
            content: blog.content.clone(),
            linked_product_id: blog.product_id.clone(),
            created_at: Utc::now(),
        };
        let mut state = self.state.lock().await;
        if state.blogs.contains_key(&created.id) {
            return Err(CommerceError::Validation(format!("文章已存在: {}", created.id)));
        }
        state.blogs.insert(created.id.clone(), created.clone());
        Ok(created)
    }
}

#[async_trait]
impl CommerceStore for InMemoryStore {
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
