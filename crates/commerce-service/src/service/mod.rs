//! 服务层
//!
//! 实现结算业务逻辑，协调仓储层。
//!
//! ## 模块结构
//!
//! - `dto`: 数据传输对象定义
//! - `order_service`: 下单结算引擎
//! - `finance_service`: 积分兑换引擎与钱包查询
//! - `catalog_service`: 商品目录读路径
//! - `blog_service`: 推荐文章增查

pub mod blog_service;
pub mod catalog_service;
pub mod dto;
pub mod finance_service;
pub mod order_service;

use std::future::Future;
use std::time::Duration;

pub use blog_service::BlogService;
pub use catalog_service::CatalogService;
pub use dto::*;
pub use finance_service::FinanceService;
pub use order_service::{OrderService, Settlement};

use crate::error::{CommerceError, Result};

/// 实际生效的截止时间：调用方可以缩短，但不能超过配置上限
pub(crate) fn effective_deadline(limit: Duration, requested: Option<Duration>) -> Duration {
    requested.map_or(limit, |requested| requested.min(limit))
}

/// 在截止时间内执行工作单元
///
/// 超时后 future 被丢弃，其持有的未提交工作单元随之回滚
pub(crate) async fn with_deadline<T>(
    deadline: Duration,
    work: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(deadline, work).await {
        Ok(result) => result,
        Err(_) => Err(CommerceError::Cancelled(
            u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_deadline_is_capped() {
        let limit = Duration::from_secs(5);
        assert_eq!(effective_deadline(limit, None), limit);
        assert_eq!(
            effective_deadline(limit, Some(Duration::from_millis(200))),
            Duration::from_millis(200)
        );
        assert_eq!(effective_deadline(limit, Some(Duration::from_secs(60))), limit);
    }

    #[tokio::test]
    async fn test_with_deadline_reports_elapsed_budget() {
        let err = with_deadline(Duration::from_millis(20), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await
        .unwrap_err();
        assert!(matches!(err, CommerceError::Cancelled(20)));
    }
}
