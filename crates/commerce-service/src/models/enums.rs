//! 枚举类型定义
//!
//! 所有枚举都支持数据库（sqlx）和 JSON（serde）序列化

use serde::{Deserialize, Serialize};

/// 订单状态
///
/// 当前只有终态 CONFIRMED，不存在取消/退款状态机
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// 已确认
    #[default]
    Confirmed,
}

/// 积分流水类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementKind {
    /// 获得（+）- 下单奖励
    Earned,
    /// 兑换（-）- 积分转余额
    Converted,
}

/// 奖励接收方角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardRole {
    Buyer,
    Author,
}

impl RewardRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buyer => "buyer",
            Self::Author => "author",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_serialization() {
        let json = serde_json::to_string(&OrderStatus::Confirmed).unwrap();
        assert_eq!(json, "\"CONFIRMED\"");
        assert_eq!(OrderStatus::default(), OrderStatus::Confirmed);
    }

    #[test]
    fn test_movement_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&MovementKind::Earned).unwrap(),
            "\"EARNED\""
        );
        assert_eq!(
            serde_json::to_string(&MovementKind::Converted).unwrap(),
            "\"CONVERTED\""
        );
    }
}
