//! 钱包仓储
//!
//! 提供钱包与积分流水的数据访问。钱包只通过原子 UPDATE 修改，
//! 不做应用层的读-改-写。

use sqlx::PgConnection;

use crate::error::{CommerceError, Result};
use crate::models::{Movement, Wallet};

const WALLET_COLUMNS: &str = "user_id, points, balance, created_at, updated_at";

pub struct WalletRepository;

impl WalletRepository {
    // ==================== 查询操作 ====================

    pub async fn get_in_tx(conn: &mut PgConnection, user_id: &str) -> Result<Option<Wallet>> {
        let wallet = sqlx::query_as::<_, Wallet>(&format!(
            "SELECT {WALLET_COLUMNS} FROM wallets WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(conn)
        .await?;

        Ok(wallet)
    }

    /// 读取并锁定钱包（FOR UPDATE）
    pub async fn get_for_update_in_tx(
        conn: &mut PgConnection,
        user_id: &str,
    ) -> Result<Option<Wallet>> {
        let wallet = sqlx::query_as::<_, Wallet>(&format!(
            "SELECT {WALLET_COLUMNS} FROM wallets WHERE user_id = $1 FOR UPDATE"
        ))
        .bind(user_id)
        .fetch_optional(conn)
        .await?;

        Ok(wallet)
    }

    pub async fn list_movements_in_tx(
        conn: &mut PgConnection,
        user_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Movement>> {
        // LIMIT NULL 等同于不限制
        let movements = sqlx::query_as::<_, Movement>(
            r#"
            SELECT id, user_id, kind, amount, related_order_id, created_at
            FROM transactions
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(conn)
        .await?;

        Ok(movements)
    }

    // ==================== 写入操作 ====================

    /// 获取钱包，不存在时创建
    ///
    /// 并发创建同一钱包时依赖主键冲突忽略，不会报错
    pub async fn get_or_create_in_tx(conn: &mut PgConnection, user_id: &str) -> Result<Wallet> {
        sqlx::query(
            r#"
            INSERT INTO wallets (user_id, points, balance, created_at, updated_at)
            VALUES ($1, 0, 0, NOW(), NOW())
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

        Self::get_in_tx(conn, user_id)
            .await?
            .ok_or_else(|| CommerceError::WalletNotFound(user_id.to_string()))
    }

    pub async fn add_points_in_tx(
        conn: &mut PgConnection,
        user_id: &str,
        points: i64,
    ) -> Result<Wallet> {
        let wallet = sqlx::query_as::<_, Wallet>(&format!(
            r#"
            UPDATE wallets
            SET points = points + $2, updated_at = NOW()
            WHERE user_id = $1
            RETURNING {WALLET_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(points)
        .fetch_optional(conn)
        .await?;

        wallet.ok_or_else(|| CommerceError::WalletNotFound(user_id.to_string()))
    }

    /// 积分转余额
    ///
    /// WHERE 条件保证积分不会被扣成负数
    pub async fn convert_points_in_tx(
        conn: &mut PgConnection,
        user_id: &str,
        points_deducted: i64,
        balance_added: i64,
    ) -> Result<Option<Wallet>> {
        let wallet = sqlx::query_as::<_, Wallet>(&format!(
            r#"
            UPDATE wallets
            SET points = points - $2, balance = balance + $3, updated_at = NOW()
            WHERE user_id = $1 AND points >= $2
            RETURNING {WALLET_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(points_deducted)
        .bind(balance_added)
        .fetch_optional(conn)
        .await?;

        Ok(wallet)
    }

    pub async fn create_movement_in_tx(conn: &mut PgConnection, movement: &Movement) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO transactions (id, user_id, kind, amount, related_order_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&movement.id)
        .bind(&movement.user_id)
        .bind(movement.kind)
        .bind(movement.amount)
        .bind(&movement.related_order_id)
        .bind(movement.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }
}
