//! 仓储 Trait 定义
//!
//! 结算引擎按能力依赖存储：每个能力 trait 都以 [`TransactionManager`] 为父 trait，
//! 共享同一个关联类型 `Tx`。`Tx` 就是显式的工作单元上下文，同一请求内的所有读写
//! 都通过它传递；提交由 [`TransactionManager::commit`] 完成，未提交即丢弃等同回滚。

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Blog, Movement, NewBlog, NewProduct, Order, Product, Wallet};

/// 工作单元管理
#[async_trait]
pub trait TransactionManager: Send + Sync {
    /// 工作单元上下文
    type Tx: Send;

    /// 开启工作单元
    async fn begin(&self) -> Result<Self::Tx>;

    /// 提交工作单元，所有写入一起生效
    async fn commit(&self, tx: Self::Tx) -> Result<()>;
}

/// 商品读取能力
#[async_trait]
pub trait ProductReader: TransactionManager {
    async fn get_product_in_tx(&self, tx: &mut Self::Tx, id: &str) -> Result<Option<Product>>;
}

/// 推荐文章读取能力
#[async_trait]
pub trait ReferralReader: TransactionManager {
    async fn get_blog_in_tx(&self, tx: &mut Self::Tx, id: &str) -> Result<Option<Blog>>;
}

/// 订单账本能力
#[async_trait]
pub trait OrderLedger: TransactionManager {
    /// 买家对某商品的历史订单数（首购判定依据）
    async fn count_orders_by_buyer_and_product_in_tx(
        &self,
        tx: &mut Self::Tx,
        buyer_id: &str,
        product_id: &str,
    ) -> Result<i64>;

    async fn create_order_in_tx(&self, tx: &mut Self::Tx, order: &Order) -> Result<()>;

    /// 登记 (买家, 商品) 的首购奖励
    ///
    /// 返回 true 表示本工作单元拿到了首购资格；该组合已被登记时返回 false。
    /// 并发登记同一组合时后到者阻塞，直到先到者提交或回滚。
    async fn claim_first_purchase_in_tx(
        &self,
        tx: &mut Self::Tx,
        buyer_id: &str,
        product_id: &str,
        order_id: &str,
    ) -> Result<bool>;
}

/// 钱包账本能力
///
/// 钱包只能通过加积分和积分兑换两个原子操作修改
#[async_trait]
pub trait WalletLedger: TransactionManager {
    async fn get_wallet_in_tx(&self, tx: &mut Self::Tx, user_id: &str) -> Result<Option<Wallet>>;

    /// 读取并锁定钱包
    async fn get_wallet_for_update_in_tx(
        &self,
        tx: &mut Self::Tx,
        user_id: &str,
    ) -> Result<Option<Wallet>>;

    /// 获取钱包，不存在则创建空钱包
    async fn get_or_create_wallet_in_tx(&self, tx: &mut Self::Tx, user_id: &str)
    -> Result<Wallet>;

    /// 原子增加积分，返回更新后的钱包
    async fn add_points_in_tx(&self, tx: &mut Self::Tx, user_id: &str, points: i64)
    -> Result<Wallet>;

    /// 原子扣减积分并增加余额
    ///
    /// 积分不足 points_deducted 时不做修改并返回 None
    async fn convert_points_to_balance_in_tx(
        &self,
        tx: &mut Self::Tx,
        user_id: &str,
        points_deducted: i64,
        balance_added: i64,
    ) -> Result<Option<Wallet>>;

    /// 追加积分流水
    async fn create_movement_in_tx(&self, tx: &mut Self::Tx, movement: &Movement) -> Result<()>;

    /// 按时间倒序列出流水，limit 为 None 时返回全部
    async fn list_movements_in_tx(
        &self,
        tx: &mut Self::Tx,
        user_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Movement>>;
}

/// 商品仓储接口（目录读路径，不参与结算事务）
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepositoryTrait: Send + Sync {
    async fn get_product(&self, id: &str) -> Result<Option<Product>>;
    async fn list_products(&self) -> Result<Vec<Product>>;
    async fn create_product(&self, id: &str, product: &NewProduct) -> Result<Product>;
}

/// 推荐文章仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlogRepositoryTrait: Send + Sync {
    async fn get_blog(&self, id: &str) -> Result<Option<Blog>>;
    async fn list_blogs(&self) -> Result<Vec<Blog>>;
    async fn create_blog(&self, blog: &NewBlog) -> Result<Blog>;
}

/// 完整的存储后端
///
/// 服务进程按配置选择 Postgres 或内存实现，HTTP 层只依赖该 trait
#[async_trait]
pub trait CommerceStore:
    ProductReader
    + ReferralReader
    + OrderLedger
    + WalletLedger
    + ProductRepositoryTrait
    + BlogRepositoryTrait
    + 'static
{
    /// 存储健康检查
    async fn health_check(&self) -> Result<()>;
}
