//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! 指标通过独立的 HTTP 端口暴露，供 Prometheus 抓取。

use anyhow::Result;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::ObservabilityConfig;

/// Metrics 资源守卫
pub struct MetricsHandle {
    _server_handle: tokio::task::JoinHandle<()>,
}

/// 初始化 Prometheus 指标导出
///
/// 启动一个独立的 HTTP 服务器在指定端口暴露 `/metrics` 端点。
pub async fn init(config: &ObservabilityConfig, service_name: &str) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    register_common_metrics(service_name);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let server_handle = start_metrics_server(addr, handle).await?;

    Ok(MetricsHandle {
        _server_handle: server_handle,
    })
}

/// 注册通用指标描述
///
/// 描述会出现在 /metrics 端点的 HELP 注释中
fn register_common_metrics(service_name: &str) {
    metrics::describe_counter!("http_requests_total", "Total number of HTTP requests");
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );

    metrics::describe_counter!("orders_placed_total", "Total number of order placements");
    metrics::describe_histogram!(
        "settlement_duration_seconds",
        "Order settlement unit-of-work duration in seconds"
    );

    metrics::describe_counter!(
        "reward_points_granted_total",
        "Total reward points granted to buyers and authors"
    );

    metrics::describe_counter!("points_conversions_total", "Total number of point conversions");
    metrics::describe_histogram!(
        "points_conversion_duration_seconds",
        "Point conversion unit-of-work duration in seconds"
    );

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

/// 启动指标 HTTP 服务器
async fn start_metrics_server(
    addr: SocketAddr,
    handle: PrometheusHandle,
) -> Result<tokio::task::JoinHandle<()>> {
    let app = Router::new()
        .route("/metrics", get(move || std::future::ready(handle.render())))
        .route("/health", get(|| async { "OK" }));

    let listener = TcpListener::bind(addr).await?;
    info!("Metrics server listening on {}", addr);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(server_handle)
}

// ============================================================================
// 便捷的指标记录函数
// ============================================================================

/// 记录 HTTP 请求
#[inline]
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let status_str = status.to_string();
    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str.clone()
    )
    .increment(1);

    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str
    )
    .record(duration_secs);
}

/// 记录下单结算
#[inline]
pub fn record_order_placement(status: &str, first_purchase: bool, duration_secs: f64) {
    metrics::counter!(
        "orders_placed_total",
        "status" => status.to_string(),
        "first_purchase" => first_purchase.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "settlement_duration_seconds",
        "status" => status.to_string()
    )
    .record(duration_secs);
}

/// 记录奖励积分发放
///
/// role 取值 buyer / author
#[inline]
pub fn record_reward_points(role: &str, points: i64) {
    metrics::counter!(
        "reward_points_granted_total",
        "role" => role.to_string()
    )
    .increment(points.max(0).unsigned_abs());
}

/// 记录积分兑换
#[inline]
pub fn record_points_conversion(status: &str, duration_secs: f64) {
    metrics::counter!(
        "points_conversions_total",
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!("points_conversion_duration_seconds").record(duration_secs);
}
