//! 下单结算服务
//!
//! 一次下单在单个工作单元内完成：
//! - 读取商品和推荐文章
//! - 判定买家是否为该商品首购
//! - 创建订单（价格快照）
//! - 给买家发放首购奖励、给作者发放推荐奖励，并写入积分流水
//!
//! 任一步失败都会丢弃整个工作单元，包括订单本身。
//!
//! ## 首购判定
//!
//! 首购 = 该 (买家, 商品) 没有历史订单，且本工作单元成功登记了首购。
//! 登记依赖存储层的唯一约束，并发的两次首购只有一次能拿到买家奖励。

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use referral_shared::observability::metrics;
use tracing::{debug, error, info, instrument, warn};

use super::dto::PlaceOrderRequest;
use super::{effective_deadline, with_deadline};
use crate::error::{CommerceError, Result};
use crate::models::{Movement, Order, RewardRole};
use crate::repository::{OrderLedger, ProductReader, ReferralReader, WalletLedger};

/// 结算结果
#[derive(Debug, Clone)]
pub struct Settlement {
    pub order: Order,
    pub first_purchase: bool,
    /// 实际发放给买家的积分
    pub buyer_reward: i64,
    /// 实际发放给作者的积分
    pub author_reward: i64,
    pub author_id: String,
}

/// 下单结算服务
pub struct OrderService<S> {
    store: Arc<S>,
    deadline: Duration,
}

impl<S> OrderService<S>
where
    S: ProductReader + ReferralReader + OrderLedger + WalletLedger,
{
    pub fn new(store: Arc<S>, deadline: Duration) -> Self {
        Self { store, deadline }
    }

    /// 下单
    ///
    /// 超过截止时间的请求会被取消，未提交的写入全部回滚。
    /// 请求自带的截止时间只能缩短服务配置的上限
    #[instrument(
        skip(self, request),
        fields(
            buyer_id = %request.buyer_id,
            product_id = %request.product_id,
            blog_id = %request.blog_id
        )
    )]
    pub async fn place_order(&self, request: PlaceOrderRequest) -> Result<Order> {
        request.validate()?;

        let start = Instant::now();
        let deadline = effective_deadline(self.deadline, request.deadline);
        let result = with_deadline(deadline, self.settle(&request)).await;
        let elapsed = start.elapsed().as_secs_f64();

        match result {
            Ok(settlement) => {
                metrics::record_order_placement("success", settlement.first_purchase, elapsed);
                if settlement.buyer_reward > 0 {
                    metrics::record_reward_points(
                        RewardRole::Buyer.as_str(),
                        settlement.buyer_reward,
                    );
                }
                if settlement.author_reward > 0 {
                    metrics::record_reward_points(
                        RewardRole::Author.as_str(),
                        settlement.author_reward,
                    );
                }

                info!(
                    order_id = %settlement.order.id,
                    amount = settlement.order.amount,
                    first_purchase = settlement.first_purchase,
                    buyer_reward = settlement.buyer_reward,
                    author_id = %settlement.author_id,
                    author_reward = settlement.author_reward,
                    "下单结算成功"
                );
                Ok(settlement.order)
            }
            Err(e) if e.is_business_error() => {
                metrics::record_order_placement("rejected", false, elapsed);
                warn!(error = %e, code = e.error_code(), "下单被拒绝");
                Err(e)
            }
            Err(e) => {
                metrics::record_order_placement("failed", false, elapsed);
                error!(
                    error = %e,
                    code = e.error_code(),
                    retryable = e.is_retryable(),
                    "下单结算失败，已回滚"
                );
                Err(e)
            }
        }
    }

    // ==================== 私有方法 ====================

    async fn settle(&self, request: &PlaceOrderRequest) -> Result<Settlement> {
        let store = self.store.as_ref();
        let mut tx = store.begin().await?;

        let product = store
            .get_product_in_tx(&mut tx, &request.product_id)
            .await?
            .ok_or_else(|| CommerceError::ProductNotFound(request.product_id.clone()))?;

        let blog = store
            .get_blog_in_tx(&mut tx, &request.blog_id)
            .await?
            .ok_or_else(|| CommerceError::BlogNotFound(request.blog_id.clone()))?;

        let prior_orders = store
            .count_orders_by_buyer_and_product_in_tx(&mut tx, &request.buyer_id, &product.id)
            .await?;
        debug!(prior_orders, "买家该商品历史订单");

        let order = Order::confirmed(&request.buyer_id, &product, &blog.id, Utc::now());
        store.create_order_in_tx(&mut tx, &order).await?;

        let first_purchase = prior_orders == 0
            && store
                .claim_first_purchase_in_tx(&mut tx, &request.buyer_id, &product.id, &order.id)
                .await?;

        store
            .get_or_create_wallet_in_tx(&mut tx, &request.buyer_id)
            .await?;
        let buyer_reward = if first_purchase && product.buyer_reward() > 0 {
            self.grant(&mut tx, &request.buyer_id, product.buyer_reward(), &order.id)
                .await?;
            product.buyer_reward()
        } else {
            0
        };

        store
            .get_or_create_wallet_in_tx(&mut tx, &blog.author_id)
            .await?;
        let author_reward = if product.author_reward() > 0 {
            self.grant(&mut tx, &blog.author_id, product.author_reward(), &order.id)
                .await?;
            product.author_reward()
        } else {
            0
        };

        store.commit(tx).await?;

        Ok(Settlement {
            order,
            first_purchase,
            buyer_reward,
            author_reward,
            author_id: blog.author_id,
        })
    }

    /// 加积分并记录 EARNED 流水
    async fn grant(
        &self,
        tx: &mut S::Tx,
        user_id: &str,
        points: i64,
        order_id: &str,
    ) -> Result<()> {
        self.store.add_points_in_tx(tx, user_id, points).await?;
        let movement = Movement::earned(user_id, points, order_id, Utc::now());
        self.store.create_movement_in_tx(tx, &movement).await
    }
}
