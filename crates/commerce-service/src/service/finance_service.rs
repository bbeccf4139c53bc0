//! 积分兑换与钱包服务
//!
//! 积分兑换规则：
//! - 持有积分必须严格大于 1000，否则拒绝，与请求数量无关
//! - 请求数量 <= 0 表示兑换全部积分
//! - 2 积分兑换 1 余额单位，向下取整，奇数尾分留在钱包
//!
//! 扣减与余额增加在同一条原子更新中完成，并追加 CONVERTED 流水。

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use referral_shared::observability::metrics;
use tracing::{error, info, instrument, warn};

use super::dto::{ConvertPointsRequest, require_id};
use super::{effective_deadline, with_deadline};
use crate::error::{CommerceError, Result};
use crate::models::{
    CONVERSION_THRESHOLD, ConversionPlan, LedgerReconciliation, Movement, Wallet,
};
use crate::repository::WalletLedger;

/// 流水查询默认条数
pub const DEFAULT_MOVEMENT_LIMIT: i64 = 50;
/// 流水查询最大条数
pub const MAX_MOVEMENT_LIMIT: i64 = 200;

/// 钱包服务
pub struct FinanceService<S> {
    store: Arc<S>,
    deadline: Duration,
}

impl<S> FinanceService<S>
where
    S: WalletLedger,
{
    pub fn new(store: Arc<S>, deadline: Duration) -> Self {
        Self { store, deadline }
    }

    /// 积分兑换余额
    #[instrument(skip(self, request), fields(user_id = %request.user_id, points = request.points))]
    pub async fn convert_points(&self, request: ConvertPointsRequest) -> Result<Wallet> {
        require_id("user_id", &request.user_id)?;

        let start = Instant::now();
        let deadline = effective_deadline(self.deadline, request.deadline);
        let result = with_deadline(deadline, self.convert(&request)).await;
        let elapsed = start.elapsed().as_secs_f64();

        match result {
            Ok((wallet, plan)) => {
                let status = if plan.is_noop() { "noop" } else { "success" };
                metrics::record_points_conversion(status, elapsed);
                info!(
                    points_deducted = plan.points_deducted,
                    balance_added = plan.balance_added,
                    points = wallet.points,
                    balance = wallet.balance,
                    "积分兑换完成"
                );
                Ok(wallet)
            }
            Err(e) if e.is_business_error() => {
                metrics::record_points_conversion("rejected", elapsed);
                warn!(error = %e, code = e.error_code(), "积分兑换被拒绝");
                Err(e)
            }
            Err(e) => {
                metrics::record_points_conversion("failed", elapsed);
                error!(
                    error = %e,
                    code = e.error_code(),
                    retryable = e.is_retryable(),
                    "积分兑换失败，已回滚"
                );
                Err(e)
            }
        }
    }

    /// 查询钱包
    #[instrument(skip(self))]
    pub async fn get_wallet(&self, user_id: &str) -> Result<Wallet> {
        require_id("user_id", user_id)?;

        let mut tx = self.store.begin().await?;
        let wallet = self
            .store
            .get_wallet_in_tx(&mut tx, user_id)
            .await?
            .ok_or_else(|| CommerceError::WalletNotFound(user_id.to_string()))?;
        self.store.commit(tx).await?;

        Ok(wallet)
    }

    /// 确保钱包存在，不存在时创建空钱包
    #[instrument(skip(self))]
    pub async fn ensure_wallet(&self, user_id: &str) -> Result<Wallet> {
        require_id("user_id", user_id)?;

        let mut tx = self.store.begin().await?;
        let wallet = self.store.get_or_create_wallet_in_tx(&mut tx, user_id).await?;
        self.store.commit(tx).await?;

        Ok(wallet)
    }

    /// 查询积分流水，按时间倒序
    ///
    /// limit 缺省为 50，限制在 1..=200
    #[instrument(skip(self))]
    pub async fn list_movements(&self, user_id: &str, limit: Option<i64>) -> Result<Vec<Movement>> {
        require_id("user_id", user_id)?;
        let limit = limit
            .unwrap_or(DEFAULT_MOVEMENT_LIMIT)
            .clamp(1, MAX_MOVEMENT_LIMIT);

        let mut tx = self.store.begin().await?;
        self.store
            .get_wallet_in_tx(&mut tx, user_id)
            .await?
            .ok_or_else(|| CommerceError::WalletNotFound(user_id.to_string()))?;
        let movements = self
            .store
            .list_movements_in_tx(&mut tx, user_id, Some(limit))
            .await?;
        self.store.commit(tx).await?;

        Ok(movements)
    }

    /// 钱包对账
    ///
    /// 在同一工作单元内读取钱包和全部流水，比较 EARNED - CONVERTED 与钱包积分
    #[instrument(skip(self))]
    pub async fn reconcile(&self, user_id: &str) -> Result<LedgerReconciliation> {
        require_id("user_id", user_id)?;

        let mut tx = self.store.begin().await?;
        let wallet = self
            .store
            .get_wallet_in_tx(&mut tx, user_id)
            .await?
            .ok_or_else(|| CommerceError::WalletNotFound(user_id.to_string()))?;
        let movements = self
            .store
            .list_movements_in_tx(&mut tx, user_id, None)
            .await?;
        self.store.commit(tx).await?;

        let report = LedgerReconciliation::from_movements(&wallet, &movements);
        if !report.consistent {
            warn!(
                wallet_points = report.wallet_points,
                earned_total = report.earned_total,
                converted_total = report.converted_total,
                "钱包积分与流水不一致"
            );
        }
        Ok(report)
    }

    // ==================== 私有方法 ====================

    async fn convert(&self, request: &ConvertPointsRequest) -> Result<(Wallet, ConversionPlan)> {
        let store = self.store.as_ref();
        let mut tx = store.begin().await?;

        let wallet = store
            .get_wallet_for_update_in_tx(&mut tx, &request.user_id)
            .await?
            .ok_or_else(|| CommerceError::WalletNotFound(request.user_id.clone()))?;

        if wallet.points <= CONVERSION_THRESHOLD {
            return Err(CommerceError::InsufficientPoints {
                held: wallet.points,
                required: CONVERSION_THRESHOLD + 1,
            });
        }

        let amount = request.resolve_amount(wallet.points);
        if amount > wallet.points {
            return Err(CommerceError::InsufficientPoints {
                held: wallet.points,
                required: amount,
            });
        }

        let plan = ConversionPlan::for_amount(amount);
        if plan.is_noop() {
            store.commit(tx).await?;
            return Ok((wallet, plan));
        }

        let updated = store
            .convert_points_to_balance_in_tx(
                &mut tx,
                &request.user_id,
                plan.points_deducted,
                plan.balance_added,
            )
            .await?
            .ok_or(CommerceError::ConcurrencyConflict)?;

        let movement = Movement::converted(&request.user_id, plan.points_deducted, Utc::now());
        store.create_movement_in_tx(&mut tx, &movement).await?;

        store.commit(tx).await?;
        Ok((updated, plan))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryStore, TransactionManager};

    async fn store_with_points(user_id: &str, points: i64) -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        let mut wallet = Wallet::empty(user_id, Utc::now());
        wallet.points = points;
        store.insert_wallet(wallet).await;
        store
    }

    #[tokio::test]
    async fn test_single_point_request_is_noop() {
        let store = store_with_points("u-1", 1500).await;
        let service = FinanceService::new(store.clone(), Duration::from_secs(5));

        let wallet = service
            .convert_points(ConvertPointsRequest::new("u-1", 1))
            .await
            .unwrap();
        assert_eq!((wallet.points, wallet.balance), (1500, 0));
        assert!(store.movements_of("u-1").await.is_empty());
    }

    #[tokio::test]
    async fn test_caller_deadline_cancels_conversion() {
        let store = store_with_points("u-1", 1500).await;
        let service = FinanceService::new(store.clone(), Duration::from_secs(30));

        let held = store.begin().await.unwrap();
        let err = service
            .convert_points(ConvertPointsRequest::new("u-1", 0).within(Duration::from_millis(25)))
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::Cancelled(25)));
        drop(held);

        let wallet = service.get_wallet("u-1").await.unwrap();
        assert_eq!((wallet.points, wallet.balance), (1500, 0));
    }

    #[tokio::test]
    async fn test_missing_wallet_is_not_found() {
        let store = Arc::new(InMemoryStore::new());
        let service = FinanceService::new(store, Duration::from_secs(5));

        let err = service
            .convert_points(ConvertPointsRequest::new("ghost", 0))
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::WalletNotFound(_)));

        let err = service.get_wallet("ghost").await.unwrap_err();
        assert!(matches!(err, CommerceError::WalletNotFound(_)));
    }

    #[tokio::test]
    async fn test_ensure_wallet_is_idempotent() {
        let store = store_with_points("u-1", 42).await;
        let service = FinanceService::new(store, Duration::from_secs(5));

        assert_eq!(service.ensure_wallet("u-1").await.unwrap().points, 42);
        let created = service.ensure_wallet("u-2").await.unwrap();
        assert_eq!((created.points, created.balance), (0, 0));
        assert_eq!(service.get_wallet("u-2").await.unwrap().user_id, "u-2");
    }

    #[tokio::test]
    async fn test_list_movements_clamps_limit() {
        let store = store_with_points("u-1", 5000).await;
        let service = FinanceService::new(store, Duration::from_secs(5));

        for _ in 0..3 {
            service
                .convert_points(ConvertPointsRequest::new("u-1", 2))
                .await
                .unwrap();
        }

        assert_eq!(service.list_movements("u-1", Some(0)).await.unwrap().len(), 1);
        assert_eq!(service.list_movements("u-1", None).await.unwrap().len(), 3);
        assert_eq!(
            service.list_movements("u-1", Some(10_000)).await.unwrap().len(),
            3
        );
    }
}
