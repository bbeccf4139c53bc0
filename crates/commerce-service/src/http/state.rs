//! 应用状态定义
//!
//! 包含 Axum 路由共享的服务实例，通过 Arc 在 handler 间共享

use std::sync::Arc;
use std::time::Duration;

use crate::repository::{BlogRepositoryTrait, CommerceStore, ProductRepositoryTrait};
use crate::service::{BlogService, CatalogService, FinanceService, OrderService};

/// Axum 应用共享状态
pub struct AppState<S> {
    pub store: Arc<S>,
    pub orders: Arc<OrderService<S>>,
    pub finance: Arc<FinanceService<S>>,
    pub catalog: Arc<CatalogService>,
    pub blogs: Arc<BlogService>,
}

impl<S: CommerceStore> AppState<S> {
    /// 基于存储后端组装全部服务
    ///
    /// deadline 为单个结算/兑换工作单元的截止时间
    pub fn new(store: Arc<S>, deadline: Duration) -> Self {
        let products: Arc<dyn ProductRepositoryTrait> = store.clone();
        let blogs: Arc<dyn BlogRepositoryTrait> = store.clone();

        Self {
            orders: Arc::new(OrderService::new(store.clone(), deadline)),
            finance: Arc::new(FinanceService::new(store.clone(), deadline)),
            catalog: Arc::new(CatalogService::new(products.clone())),
            blogs: Arc::new(BlogService::new(blogs, products)),
            store,
        }
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            orders: self.orders.clone(),
            finance: self.finance.clone(),
            catalog: self.catalog.clone(),
            blogs: self.blogs.clone(),
        }
    }
}
