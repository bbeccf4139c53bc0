//! 领域模型
//!
//! 包含推荐电商结算系统的所有核心实体定义

pub mod catalog;
pub mod enums;
pub mod order;
pub mod wallet;

// 重新导出常用类型
pub use catalog::{Blog, NewBlog, NewProduct, Product};
pub use enums::{MovementKind, OrderStatus, RewardRole};
pub use order::Order;
pub use wallet::{
    CONVERSION_THRESHOLD, ConversionPlan, LedgerReconciliation, Movement,
    POINTS_PER_BALANCE_UNIT, Wallet,
};
