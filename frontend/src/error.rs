//! 客户端错误类型
//!
//! 与错误分类一一对应：本地校验、鉴权失效、请求/业务失败。
//! `Display` 的输出就是展示给用户的那一句话。

use dispatchboard_shared::export::ExportError;
use dispatchboard_shared::validation::{FormError, UploadRejection};
use thiserror::Error;

/// 传输层错误（请求没有拿到任何 HTTP 响应）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("failed to build request: {0}")]
    Build(String),
    #[error("{0}")]
    Network(String),
    #[error("request timed out after {0} seconds")]
    Timeout(u64),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    /// 发出请求前的本地校验失败
    #[error("{0}")]
    Validation(String),
    /// 401：会话已被清除
    #[error("{0}")]
    Unauthorized(String),
    /// 信封 `success=false`
    #[error("{message}")]
    Rejected {
        status: u16,
        message: String,
        errors: Vec<serde_json::Value>,
    },
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),
    #[error("Network error: {0}")]
    Network(String),
    /// 非 2xx 且响应体不是信封
    #[error("Request failed with status code {0}")]
    Status(u16),
    /// 2xx 但响应体无法解析
    #[error("Unexpected response from server: {0}")]
    Decode(String),
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

impl ClientError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized(_))
    }

    /// 供界面展示的错误信息
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<TransportError> for ClientError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Timeout(secs) => ClientError::Timeout(secs),
            TransportError::Build(msg) | TransportError::Network(msg) => ClientError::Network(msg),
        }
    }
}

impl From<FormError> for ClientError {
    fn from(e: FormError) -> Self {
        ClientError::Validation(e.to_string())
    }
}

impl From<UploadRejection> for ClientError {
    fn from(e: UploadRejection) -> Self {
        ClientError::Validation(e.to_string())
    }
}

impl From<ExportError> for ClientError {
    fn from(e: ExportError) -> Self {
        ClientError::Validation(e.to_string())
    }
}
