// ==========================================
// 配方成本管理系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository错误为用户友好的错误消息
// 分类: NotFound / ValidationError / InvalidOperation / 数据访问错误
// ==========================================

use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 命令层可见的错误; `code()` 给出稳定的错误代码
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 字段校验失败(持久化之前)
    #[error("数据验证失败: {reason}")]
    ValidationError {
        reason: String,
        violations: Vec<FieldViolation>,
    },

    /// 唯一键冲突、材料仍被引用、配方内材料重复
    #[error("非法操作: {0}")]
    InvalidOperation(String),

    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::InvalidOperation(_) => "INVALID_OPERATION",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::DatabaseTransactionError(_) => "DATABASE_TRANSACTION_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        if err.is_constraint() {
            return ApiError::InvalidOperation(err.to_string());
        }
        match err {
            RepositoryError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::Decode { .. } => ApiError::InternalError(err.to_string()),
            other => ApiError::DatabaseError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// 字段级校验违规
// ==========================================

/// 字段校验违规详情
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// 字段名
    pub field: String,
    /// 违规原因
    pub reason: String,
}

impl FieldViolation {
    pub fn new(field: &str, reason: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
