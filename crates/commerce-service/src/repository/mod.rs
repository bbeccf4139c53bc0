//! 数据访问层
//!
//! 提供所有实体的数据访问接口，封装存储细节。
//!
//! ## 设计原则
//!
//! - 仓储只负责数据持久化，不包含业务逻辑
//! - 工作单元由服务层开启和提交，仓储方法只接收显式传入的事务上下文
//! - Postgres 与内存两种实现满足同一组能力 trait

mod blog_repo;
mod memory;
mod order_repo;
mod pg_store;
mod product_repo;
mod traits;
mod wallet_repo;

pub use blog_repo::BlogRepository;
pub use memory::{FailPoint, InMemoryStore, MemoryTx};
pub use order_repo::OrderRepository;
pub use pg_store::PgStore;
pub use product_repo::ProductRepository;
pub use traits::*;
pub use wallet_repo::WalletRepository;
