//! 推荐电商结算服务入口
//!
//! 加载配置、初始化可观测性、按配置选择存储后端并启动 REST 服务。

use std::sync::Arc;
use std::time::Duration;

use referral_commerce::{
    CommerceStore, InMemoryStore, MIGRATOR, PgStore,
    http::{self, AppState},
    seed,
};
use referral_shared::{
    config::{AppConfig, StorageBackend},
    database::Database,
    observability,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

const SERVICE_NAME: &str = "commerce-service";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load(SERVICE_NAME)?;
    let _guard = observability::init(&config.observability, &config.service_name).await?;

    info!(
        environment = %config.environment,
        backend = ?config.storage.backend,
        "Starting {} on {}",
        SERVICE_NAME,
        config.server_addr()
    );

    let deadline = Duration::from_millis(config.settlement.request_timeout_ms);

    match config.storage.backend {
        StorageBackend::Postgres => {
            let db = Database::connect(&config.database).await?;
            if config.database.run_migrations {
                db.run_migrations(&MIGRATOR).await?;
            }
            let store = Arc::new(PgStore::new(db.pool().clone()));
            serve(&config, AppState::new(store, deadline)).await?;
            db.close().await;
        }
        StorageBackend::Memory => {
            // 内存后端每次启动都是空的，预置商品目录便于演示
            let state = AppState::new(Arc::new(InMemoryStore::new()), deadline);
            seed::seed_products(&state.catalog).await?;
            seed::seed_blogs(&state.blogs).await?;
            serve(&config, state).await?;
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

async fn serve<S: CommerceStore>(config: &AppConfig, state: AppState<S>) -> anyhow::Result<()> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = http::app(state).layer(cors);

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    // 收到 SIGTERM 或 Ctrl+C 后停止接收新连接，等待已有请求处理完毕
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// 监听关闭信号
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "注册 Ctrl+C 处理器失败");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "注册 SIGTERM 处理器失败");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
