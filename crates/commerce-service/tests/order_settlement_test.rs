//! 下单结算集成测试
//!
//! 使用内存存储运行完整的结算引擎，覆盖首购奖励、作者奖励、
//! 失败回滚以及并发首购等场景（无需外部依赖）

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use fake::{Fake, faker::lorem::en::Sentence};
use referral_commerce::{
    Blog, CommerceError, ErrorKind, FailPoint, FinanceService, InMemoryStore, MovementKind,
    OrderService, OrderStatus, PlaceOrderRequest, Product,
};
use tokio_test::{assert_err, assert_ok};
use uuid::Uuid;

// ==================== 辅助函数 ====================

const DEADLINE: Duration = Duration::from_secs(5);

struct Fixture {
    store: Arc<InMemoryStore>,
    orders: OrderService<InMemoryStore>,
    finance: FinanceService<InMemoryStore>,
}

impl Fixture {
    fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            orders: OrderService::new(store.clone(), DEADLINE),
            finance: FinanceService::new(store.clone(), DEADLINE),
            store,
        }
    }

    async fn product(&self, price: i64, buyer_reward: i32, author_reward: i32) -> Product {
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: "Soda Pro Skater".to_string(),
            description: Sentence(3..8).fake(),
            price,
            buyer_reward_points: buyer_reward,
            author_reward_points: author_reward,
            created_at: Utc::now(),
        };
        self.store.insert_product(product.clone()).await;
        product
    }

    async fn blog(&self, author_id: &str, product: &Product) -> Blog {
        let blog = Blog {
            id: Uuid::new_v4().to_string(),
            author_id: author_id.to_string(),
            content: Sentence(5..12).fake(),
            linked_product_id: product.id.clone(),
            created_at: Utc::now(),
        };
        self.store.insert_blog(blog.clone()).await;
        blog
    }

    async fn points(&self, user_id: &str) -> i64 {
        self.store.wallet(user_id).await.map_or(0, |w| w.points)
    }
}

fn user() -> String {
    Uuid::new_v4().to_string()
}

// ==================== 奖励发放 ====================

#[tokio::test]
async fn test_first_and_repeat_purchase_scenario() {
    let fx = Fixture::new();
    let (buyer, author) = (user(), user());
    let product = fx.product(1000, 100, 50).await;
    let blog = fx.blog(&author, &product).await;

    let order = assert_ok!(
        fx.orders
            .place_order(PlaceOrderRequest::new(&buyer, &product.id, &blog.id))
            .await
    );
    assert_eq!(order.amount, 1000);
    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(order.buyer_id, buyer);
    assert_eq!(order.referral_id, blog.id);
    assert_eq!(fx.points(&buyer).await, 100);
    assert_eq!(fx.points(&author).await, 50);

    // 同一商品再次购买：买家不再获得奖励，作者照常获得
    assert_ok!(
        fx.orders
            .place_order(PlaceOrderRequest::new(&buyer, &product.id, &blog.id))
            .await
    );
    assert_eq!(fx.points(&buyer).await, 100);
    assert_eq!(fx.points(&author).await, 100);
    assert_eq!(fx.store.orders().await.len(), 2);
}

#[tokio::test]
async fn test_first_purchase_is_scoped_per_product() {
    let fx = Fixture::new();
    let (buyer, author) = (user(), user());
    let shoe = fx.product(100, 10, 5).await;
    let boot = fx.product(700, 70, 35).await;
    let shoe_blog = fx.blog(&author, &shoe).await;
    let boot_blog = fx.blog(&author, &boot).await;

    for (product, blog) in [(&shoe, &shoe_blog), (&boot, &boot_blog)] {
        assert_ok!(
            fx.orders
                .place_order(PlaceOrderRequest::new(&buyer, &product.id, &blog.id))
                .await
        );
    }

    assert_eq!(fx.points(&buyer).await, 80);
    assert_eq!(fx.points(&author).await, 40);
}

#[tokio::test]
async fn test_earned_movements_reference_order() {
    let fx = Fixture::new();
    let (buyer, author) = (user(), user());
    let product = fx.product(300, 30, 15).await;
    let blog = fx.blog(&author, &product).await;

    let order = fx
        .orders
        .place_order(PlaceOrderRequest::new(&buyer, &product.id, &blog.id))
        .await
        .unwrap();

    let buyer_movements = fx.store.movements_of(&buyer).await;
    assert_eq!(buyer_movements.len(), 1);
    assert_eq!(buyer_movements[0].kind, MovementKind::Earned);
    assert_eq!(buyer_movements[0].amount, 30);
    assert_eq!(
        buyer_movements[0].related_order_id.as_deref(),
        Some(order.id.as_str())
    );

    let author_movements = fx.store.movements_of(&author).await;
    assert_eq!(author_movements.len(), 1);
    assert_eq!(author_movements[0].amount, 15);
}

#[tokio::test]
async fn test_zero_rewards_still_create_wallets() {
    let fx = Fixture::new();
    let (buyer, author) = (user(), user());
    let product = fx.product(0, 0, 0).await;
    let blog = fx.blog(&author, &product).await;

    assert_ok!(
        fx.orders
            .place_order(PlaceOrderRequest::new(&buyer, &product.id, &blog.id))
            .await
    );

    assert_eq!(assert_ok!(fx.finance.get_wallet(&buyer).await).points, 0);
    assert_eq!(assert_ok!(fx.finance.get_wallet(&author).await).points, 0);
    assert!(fx.store.movements_of(&buyer).await.is_empty());
}

#[tokio::test]
async fn test_buyer_can_be_own_referrer() {
    let fx = Fixture::new();
    let buyer = user();
    let product = fx.product(500, 50, 25).await;
    let blog = fx.blog(&buyer, &product).await;

    assert_ok!(
        fx.orders
            .place_order(PlaceOrderRequest::new(&buyer, &product.id, &blog.id))
            .await
    );
    assert_eq!(fx.points(&buyer).await, 75);
    assert_eq!(fx.store.movements_of(&buyer).await.len(), 2);
}

// ==================== 失败回滚 ====================

#[tokio::test]
async fn test_missing_referral_leaves_no_trace() {
    let fx = Fixture::new();
    let buyer = user();
    let product = fx.product(1000, 100, 50).await;

    let err = assert_err!(
        fx.orders
            .place_order(PlaceOrderRequest::new(&buyer, &product.id, "no-such-blog"))
            .await
    );
    assert!(matches!(err, CommerceError::BlogNotFound(_)));
    assert_eq!(err.kind(), ErrorKind::NotFound);

    assert!(fx.store.orders().await.is_empty());
    assert!(fx.store.wallet(&buyer).await.is_none());
}

#[tokio::test]
async fn test_missing_product_is_not_found() {
    let fx = Fixture::new();
    let (buyer, author) = (user(), user());
    let product = fx.product(1000, 100, 50).await;
    let blog = fx.blog(&author, &product).await;

    let err = assert_err!(
        fx.orders
            .place_order(PlaceOrderRequest::new(&buyer, "no-such-product", &blog.id))
            .await
    );
    assert!(matches!(err, CommerceError::ProductNotFound(_)));
    assert!(fx.store.orders().await.is_empty());
}

#[tokio::test]
async fn test_failure_after_order_insert_rolls_back_everything() {
    for point in [FailPoint::AddPoints, FailPoint::CreateMovement, FailPoint::Commit] {
        let fx = Fixture::new();
        let (buyer, author) = (user(), user());
        let product = fx.product(1000, 100, 50).await;
        let blog = fx.blog(&author, &product).await;

        fx.store.fail_at(point);
        assert_err!(
            fx.orders
                .place_order(PlaceOrderRequest::new(&buyer, &product.id, &blog.id))
                .await
        );

        assert!(fx.store.orders().await.is_empty(), "{point:?}");
        assert!(fx.store.wallet(&buyer).await.is_none(), "{point:?}");
        assert!(fx.store.wallet(&author).await.is_none(), "{point:?}");
        assert!(fx.store.movements_of(&buyer).await.is_empty(), "{point:?}");

        // 故障排除后首购资格仍在
        fx.store.clear_failure(point);
        assert_ok!(
            fx.orders
                .place_order(PlaceOrderRequest::new(&buyer, &product.id, &blog.id))
                .await
        );
        assert_eq!(fx.points(&buyer).await, 100, "{point:?}");
    }
}

// ==================== 并发 ====================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_purchases_reward_buyer_once() {
    let fx = Fixture::new();
    let (buyer, author) = (user(), user());
    let product = fx.product(1000, 100, 50).await;
    let blog = fx.blog(&author, &product).await;
    let service = Arc::new(OrderService::new(fx.store.clone(), DEADLINE));

    let attempts = 16;
    let handles: Vec<_> = (0..attempts)
        .map(|_| {
            let service = service.clone();
            let request = PlaceOrderRequest::new(&buyer, &product.id, &blog.id);
            tokio::spawn(async move { service.place_order(request).await })
        })
        .collect();

    for result in futures::future::join_all(handles).await {
        assert_ok!(result.unwrap());
    }

    assert_eq!(fx.store.orders().await.len(), attempts);
    assert_eq!(fx.points(&buyer).await, 100);
    assert_eq!(fx.points(&author).await, 50 * attempts as i64);
}

#[tokio::test]
async fn test_ledger_reconciles_after_settlements() {
    let fx = Fixture::new();
    let (buyer, author) = (user(), user());
    let product = fx.product(1500, 150, 75).await;
    let blog = fx.blog(&author, &product).await;

    for _ in 0..3 {
        fx.orders
            .place_order(PlaceOrderRequest::new(&buyer, &product.id, &blog.id))
            .await
            .unwrap();
    }

    for user_id in [&buyer, &author] {
        let report = fx.finance.reconcile(user_id).await.unwrap();
        assert!(report.consistent);
        assert_eq!(report.converted_total, 0);
        assert!(report.wallet_points >= 0);
    }
    assert_eq!(fx.finance.reconcile(&author).await.unwrap().earned_total, 225);
}
