//! 商品目录初始化工具
//!
//! 向 Postgres 写入固定的商品目录，可选写入演示文章。已存在的记录会被跳过。

use std::sync::Arc;

use clap::Parser;
use referral_commerce::{BlogService, CatalogService, MIGRATOR, PgStore, seed};
use referral_shared::{config::AppConfig, database::Database, observability};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "commerce-seed")]
#[command(about = "初始化推荐电商的商品目录")]
struct Args {
    /// 数据库连接串，缺省时使用配置文件
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// 同时写入演示文章
    #[arg(long)]
    with_blogs: bool,

    /// 写入前执行数据库迁移
    #[arg(long)]
    migrate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load("commerce-seed")?;
    if let Some(url) = args.database_url {
        config.database.url = url;
    }
    config.observability.metrics_enabled = false;
    let _guard = observability::init(&config.observability, &config.service_name).await?;

    let db = Database::connect(&config.database).await?;
    if args.migrate {
        db.run_migrations(&MIGRATOR).await?;
    }

    let store = Arc::new(PgStore::new(db.pool().clone()));
    let catalog = CatalogService::new(store.clone());
    let report = seed::seed_products(&catalog).await?;
    info!(created = report.created, skipped = report.skipped, "商品写入完成");

    if args.with_blogs {
        let blogs = BlogService::new(store.clone(), store);
        let report = seed::seed_blogs(&blogs).await?;
        info!(created = report.created, skipped = report.skipped, "文章写入完成");
    }

    db.close().await;
    Ok(())
}
