// ==========================================
// 课程平台同行评审系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型,转换Repository错误为用户友好的错误消息
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
/// 所有错误信息必须包含显式原因
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 并发控制错误
    // ==========================================
    #[error("并发冲突: {0}")]
    ConcurrencyConflict(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("内部错误: {0}")]
    InternalError(String),
}

// Repository错误 -> API错误
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),
            RepositoryError::BusinessRuleViolation(msg) => ApiError::InvalidInput(msg),
            RepositoryError::VersionConflict { .. }
            | RepositoryError::OptimisticLockFailure { .. } => {
                ApiError::ConcurrencyConflict(err.to_string())
            }
            RepositoryError::SchemaVersionMismatch { .. }
            | RepositoryError::SerializationError(_)
            | RepositoryError::InternalError(_)
            | RepositoryError::Other(_) => ApiError::InternalError(err.to_string()),
            _ => ApiError::DatabaseError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
