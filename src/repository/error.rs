// ==========================================
// 配方成本管理系统 - 仓储层错误类型
// ==========================================
// SQLite 失败按约束类别归类,上层只需关心
// "不存在 / 约束冲突 / 存储故障" 三类结果
// ==========================================

use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("{entity}(id={id})不存在")]
    NotFound { entity: &'static str, id: i64 },

    #[error("唯一约束违反: {0}")]
    UniqueConstraintViolation(String),

    #[error("外键约束违反: {0}")]
    ForeignKeyViolation(String),

    /// 事务内检测到的业务规则冲突(如配方内材料重复)
    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    /// 成本计算溢出或超出金额列上限
    #[error("成本超出可表示范围: {0}")]
    CostOverflow(String),

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    /// 列值无法解码(小数、时间戳、枚举文本)
    #[error("列解码失败 (column={column}): {message}")]
    Decode { column: usize, message: String },

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),
}

impl RepositoryError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        RepositoryError::NotFound { entity, id }
    }

    /// 是否为约束类冲突(含成本越界),调用方视为非法操作而非故障
    pub fn is_constraint(&self) -> bool {
        matches!(
            self,
            RepositoryError::UniqueConstraintViolation(_)
                | RepositoryError::ForeignKeyViolation(_)
                | RepositoryError::BusinessRuleViolation(_)
                | RepositoryError::CostOverflow(_)
        )
    }
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(code, msg)
                if code.code == ErrorCode::ConstraintViolation =>
            {
                let msg = msg.unwrap_or_else(|| code.to_string());
                if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else {
                    RepositoryError::BusinessRuleViolation(msg)
                }
            }
            rusqlite::Error::FromSqlConversionFailure(column, _, source) => {
                RepositoryError::Decode {
                    column,
                    message: source.to_string(),
                }
            }
            other => RepositoryError::DatabaseQueryError(other.to_string()),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
