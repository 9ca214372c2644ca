//! 错误类型
//!
//! `StoreError` 表示数据源错误，`QueryError` 是处理器返回的错误

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ErrorResponse;

/// 数据源访问失败
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("data store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("data store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed data store response: {0}")]
    Malformed(String),
}

/// 请求级错误，映射为状态码和 `{"error": ...}` 响应体
#[derive(Debug, Error)]
pub enum QueryError {
    /// 参数缺失或无效
    #[error("{0}")]
    Validation(String),

    /// 查询成功但没有匹配的数据
    #[error("{0}")]
    NotFound(String),

    /// 数据源故障或数据无法解析；`detail` 只写日志，不返回给客户端
    #[error("{message}")]
    Backend { message: &'static str, detail: String },
}

impl QueryError {
    pub fn backend(message: &'static str, detail: impl ToString) -> Self {
        QueryError::Backend {
            message,
            detail: detail.to_string(),
        }
    }
}

impl ResponseError for QueryError {
    fn status_code(&self) -> StatusCode {
        match self {
            QueryError::Validation(_) => StatusCode::BAD_REQUEST,
            QueryError::NotFound(_) => StatusCode::NOT_FOUND,
            QueryError::Backend { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let QueryError::Backend { message, detail } = self {
            log::error!("{}: {}", message, detail);
        }
        HttpResponse::build(self.status_code()).json(ErrorResponse::new(self.to_string()))
    }
}
