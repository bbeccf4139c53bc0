//! 推荐电商结算服务
//!
//! 买家购买商品，作者通过推荐文章带来成交后获得奖励积分，
//! 双方积分可按固定比例兑换为可消费余额。
//!
//! ## 核心功能
//!
//! - **下单结算**：单个工作单元内创建订单，发放买家首购奖励和作者推荐奖励
//! - **积分兑换**：门槛校验、向下取整兑换、原子扣减并记录流水
//! - **积分账本**：每次积分变动追加一条流水，可与钱包对账
//! - **目录读路径**：商品与推荐文章查询
//!
//! ## 模块结构
//!
//! - `models`: 领域模型定义
//! - `error`: 错误类型定义
//! - `repository`: 存储能力 trait 及 Postgres / 内存实现
//! - `service`: 结算与兑换引擎
//! - `http`: REST 传输层
//! - `seed`: 商品目录初始化数据

pub mod error;
pub mod http;
pub mod models;
pub mod repository;
pub mod seed;
pub mod service;

pub use error::{CommerceError, ErrorKind, Result};
pub use models::*;
pub use repository::{CommerceStore, FailPoint, InMemoryStore, PgStore};
pub use service::{
    BlogService, CatalogService, ConvertPointsRequest, FinanceService, OrderService,
    PlaceOrderRequest, WalletDto,
};

/// 内置数据库迁移
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
