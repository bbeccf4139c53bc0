//! REST 传输层
//!
//! JSON 字段统一使用 camelCase，错误按类别映射为 HTTP 状态码

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::app;
pub use state::AppState;
