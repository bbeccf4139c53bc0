//! 结算服务错误类型
//!
//! 定义服务层的业务错误和系统错误。引擎不做局部恢复，
//! 任何失败都会中止整个工作单元并把具体错误原样抛给调用方。

use thiserror::Error;

/// 结算服务错误类型
#[derive(Debug, Error)]
pub enum CommerceError {
    // === 目录相关错误 ===
    #[error("商品不存在: {0}")]
    ProductNotFound(String),

    #[error("推荐文章不存在: {0}")]
    BlogNotFound(String),

    // === 钱包相关错误 ===
    #[error("钱包不存在: {0}")]
    WalletNotFound(String),

    #[error("积分不足: 持有 {held}, 需要 {required}")]
    InsufficientPoints { held: i64, required: i64 },

    // === 系统错误 ===
    #[error("参数校验失败: {0}")]
    Validation(String),

    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("并发冲突，请重试")]
    ConcurrencyConflict,

    #[error("请求已超时取消: 超过 {0}ms")]
    Cancelled(u64),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 结算服务 Result 类型别名
pub type Result<T> = std::result::Result<T, CommerceError>;

/// 错误类别
///
/// 传输层只依据类别映射状态码，不关心具体变体
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InsufficientPoints,
    ValidationFailed,
    ConflictOrTransient,
    Cancelled,
    Internal,
}

impl CommerceError {
    /// 错误类别
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ProductNotFound(_) | Self::BlogNotFound(_) | Self::WalletNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::InsufficientPoints { .. } => ErrorKind::InsufficientPoints,
            Self::Validation(_) => ErrorKind::ValidationFailed,
            Self::Database(e) => storage_kind(e),
            Self::ConcurrencyConflict => ErrorKind::ConflictOrTransient,
            Self::Cancelled(_) => ErrorKind::Cancelled,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// 检查是否为可重试的错误
    ///
    /// 核心本身从不重试，该标记仅供调用方参考
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::ConflictOrTransient | ErrorKind::Cancelled
        )
    }

    /// 检查是否为业务错误（非系统错误）
    pub fn is_business_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::NotFound | ErrorKind::InsufficientPoints | ErrorKind::ValidationFailed
        )
    }

    /// 获取错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            Self::BlogNotFound(_) => "BLOG_NOT_FOUND",
            Self::WalletNotFound(_) => "WALLET_NOT_FOUND",
            Self::InsufficientPoints { .. } => "INSUFFICIENT_POINTS",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::ConcurrencyConflict => "CONCURRENCY_CONFLICT",
            Self::Cancelled(_) => "REQUEST_CANCELLED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// 存储错误分类
///
/// 约束冲突、序列化失败、连接池耗尽与 IO 中断视为冲突或瞬时错误，
/// 其余（列缺失、解码失败、无结果等）属于内部错误
fn storage_kind(err: &sqlx::Error) -> ErrorKind {
    match err {
        sqlx::Error::Database(db) => {
            // 40001 序列化失败，40P01 死锁
            let retryable_state = db
                .code()
                .is_some_and(|code| matches!(code.as_ref(), "40001" | "40P01"));
            if db.is_unique_violation()
                || db.is_foreign_key_violation()
                || db.is_check_violation()
                || retryable_state
            {
                ErrorKind::ConflictOrTransient
            } else {
                ErrorKind::Internal
            }
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            ErrorKind::ConflictOrTransient
        }
        _ => ErrorKind::Internal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    /// 模拟驱动返回的数据库错误
    #[derive(Debug)]
    struct FakeDbError {
        code: &'static str,
        kind: sqlx::error::ErrorKind,
    }

    impl fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "fake database error {}", self.code)
        }
    }

    impl StdError for FakeDbError {}

    impl sqlx::error::DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            "fake database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.code))
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            use sqlx::error::ErrorKind as DbKind;
            match self.kind {
                DbKind::UniqueViolation => DbKind::UniqueViolation,
                DbKind::ForeignKeyViolation => DbKind::ForeignKeyViolation,
                DbKind::NotNullViolation => DbKind::NotNullViolation,
                DbKind::CheckViolation => DbKind::CheckViolation,
                _ => DbKind::Other,
            }
        }
    }

    fn db_error(code: &'static str, kind: sqlx::error::ErrorKind) -> CommerceError {
        CommerceError::Database(sqlx::Error::Database(Box::new(FakeDbError { code, kind })))
    }

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(
            CommerceError::ProductNotFound("p".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            CommerceError::WalletNotFound("u".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            CommerceError::Database(sqlx::Error::PoolTimedOut).kind(),
            ErrorKind::ConflictOrTransient
        );
        assert_eq!(CommerceError::Cancelled(100).kind(), ErrorKind::Cancelled);
    }

    #[test]
    fn test_storage_error_classification() {
        use sqlx::error::ErrorKind as DbKind;

        let transient = [
            CommerceError::Database(sqlx::Error::PoolTimedOut),
            CommerceError::Database(sqlx::Error::PoolClosed),
            CommerceError::Database(sqlx::Error::Io(std::io::Error::other("reset"))),
            db_error("23505", DbKind::UniqueViolation),
            db_error("23503", DbKind::ForeignKeyViolation),
            db_error("23514", DbKind::CheckViolation),
            db_error("40001", DbKind::Other),
            db_error("40P01", DbKind::Other),
        ];
        for err in &transient {
            assert_eq!(err.kind(), ErrorKind::ConflictOrTransient, "{err}");
            assert!(err.is_retryable(), "{err}");
        }

        let internal = [
            CommerceError::Database(sqlx::Error::RowNotFound),
            CommerceError::Database(sqlx::Error::ColumnNotFound("balance".into())),
            CommerceError::Database(sqlx::Error::Protocol("bad frame".into())),
            db_error("42P01", DbKind::Other),
            db_error("23502", DbKind::NotNullViolation),
        ];
        for err in &internal {
            assert_eq!(err.kind(), ErrorKind::Internal, "{err}");
            assert!(!err.is_retryable(), "{err}");
        }
    }

    #[test]
    fn test_error_is_retryable() {
        assert!(CommerceError::ConcurrencyConflict.is_retryable());
        assert!(CommerceError::Database(sqlx::Error::PoolTimedOut).is_retryable());
        assert!(!CommerceError::BlogNotFound("b".into()).is_retryable());
        assert!(
            !CommerceError::InsufficientPoints {
                held: 10,
                required: 20
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_error_is_business_error() {
        assert!(CommerceError::Validation("empty".into()).is_business_error());
        assert!(!CommerceError::Internal("bug".into()).is_business_error());
        assert!(!CommerceError::ConcurrencyConflict.is_business_error());
    }

    #[test]
    fn test_error_code_and_display() {
        let err = CommerceError::InsufficientPoints {
            held: 1000,
            required: 1001,
        };
        assert_eq!(err.error_code(), "INSUFFICIENT_POINTS");
        assert!(err.to_string().contains("1000"));
        assert!(err.to_string().contains("1001"));
        assert_eq!(
            CommerceError::Cancelled(5).error_code(),
            "REQUEST_CANCELLED"
        );
    }
}
