//! 钱包与积分流水实体定义
//!
//! 钱包按用户惰性创建；流水只追加，是钱包积分的审计依据

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::MovementKind;

/// 兑换门槛：持有积分必须严格大于该值才允许兑换
pub const CONVERSION_THRESHOLD: i64 = 1000;

/// 兑换比例：多少积分兑换 1 个余额单位
pub const POINTS_PER_BALANCE_UNIT: i64 = 2;

/// 用户钱包
///
/// points 和 balance 始终非负
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub user_id: String,
    /// 可兑换积分
    pub points: i64,
    /// 可消费余额（最小货币单位）
    pub balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    /// 新建空钱包
    pub fn empty(user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            points: 0,
            balance: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// 积分流水
///
/// EARNED 流水关联订单，CONVERTED 流水不关联订单
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    pub id: String,
    pub user_id: String,
    pub kind: MovementKind,
    /// 变动积分数量（恒为正）
    pub amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_order_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Movement {
    /// 下单奖励流水
    pub fn earned(user_id: &str, amount: i64, order_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            kind: MovementKind::Earned,
            amount,
            related_order_id: Some(order_id.to_string()),
            created_at: now,
        }
    }

    /// 积分兑换流水
    pub fn converted(user_id: &str, amount: i64, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            kind: MovementKind::Converted,
            amount,
            related_order_id: None,
            created_at: now,
        }
    }
}

/// 兑换计划
///
/// 按 2 积分 = 1 余额单位向下取整，奇数尾分留在钱包中
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionPlan {
    /// 实际扣减的积分
    pub points_deducted: i64,
    /// 增加的余额
    pub balance_added: i64,
}

impl ConversionPlan {
    pub fn for_amount(amount: i64) -> Self {
        let units = amount / POINTS_PER_BALANCE_UNIT;
        Self {
            points_deducted: units * POINTS_PER_BALANCE_UNIT,
            balance_added: units,
        }
    }

    /// 扣减为 0 时无需落库
    pub fn is_noop(&self) -> bool {
        self.points_deducted == 0
    }
}

/// 钱包对账结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerReconciliation {
    pub user_id: String,
    pub wallet_points: i64,
    pub earned_total: i64,
    pub converted_total: i64,
    /// earned_total - converted_total == wallet_points
    pub consistent: bool,
}

impl LedgerReconciliation {
    pub fn from_movements(wallet: &Wallet, movements: &[Movement]) -> Self {
        let total_of = |kind: MovementKind| {
            movements
                .iter()
                .filter(|m| m.kind == kind)
                .map(|m| m.amount)
                .sum::<i64>()
        };
        let earned_total = total_of(MovementKind::Earned);
        let converted_total = total_of(MovementKind::Converted);

        Self {
            user_id: wallet.user_id.clone(),
            wallet_points: wallet.points,
            earned_total,
            converted_total,
            consistent: earned_total - converted_total == wallet.points,
        }
    }
}
