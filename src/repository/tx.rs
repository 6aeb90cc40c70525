// ==========================================
// 配方成本管理系统 - 事务辅助
// ==========================================
// 职责: 共享连接加锁 + BEGIN IMMEDIATE 事务包装
// 约束: 写事务一律 IMMEDIATE,跨进程写入在 SQLite 写锁上串行
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::sync::{Arc, Mutex, MutexGuard};

/// 共享连接句柄
pub type SharedConnection = Arc<Mutex<Connection>>;

/// 获取数据库连接
pub fn lock_conn(conn: &SharedConnection) -> RepositoryResult<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|e| RepositoryError::LockError(e.to_string()))
}

/// 在 IMMEDIATE 写事务中执行闭包
///
/// 闭包返回 Err 时事务随 Transaction drop 回滚
pub fn with_immediate_tx<T, F>(conn: &SharedConnection, f: F) -> RepositoryResult<T>
where
    F: FnOnce(&Transaction<'_>) -> RepositoryResult<T>,
{
    let mut guard = lock_conn(conn)?;
    let tx = guard
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

    let value = f(&tx)?;

    tx.commit()
        .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
    Ok(value)
}

/// 在 DEFERRED 读事务中执行闭包
///
/// 多条查询共享同一快照,其他连接的提交不会插入其间
pub fn with_read_tx<T, F>(conn: &SharedConnection, f: F) -> RepositoryResult<T>
where
    F: FnOnce(&Connection) -> RepositoryResult<T>,
{
    let mut guard = lock_conn(conn)?;
    let tx = guard
        .transaction_with_behavior(TransactionBehavior::Deferred)
        .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

    let value = f(&tx)?;

    tx.commit()
        .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
    Ok(value)
}

/// 在只读连接上执行闭包
pub fn with_conn<T, F>(conn: &SharedConnection, f: F) -> RepositoryResult<T>
where
    F: FnOnce(&Connection) -> RepositoryResult<T>,
{
    let guard = lock_conn(conn)?;
    f(&guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_rolls_back() {
        let conn: SharedConnection = Arc::new(Mutex::new(Connection::open_in_memory().unwrap()));
        with_conn(&conn, |c| {
            c.execute_batch("CREATE TABLE t (v INTEGER)")?;
            Ok(())
        })
        .unwrap();

        let result: RepositoryResult<()> = with_immediate_tx(&conn, |tx| {
            tx.execute("INSERT INTO t VALUES (1)", [])?;
            Err(RepositoryError::BusinessRuleViolation("abort".to_string()))
        });
        assert!(result.is_err());

        let count: i64 = with_conn(&conn, |c| {
            Ok(c.query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0))?)
        })
        .unwrap();
        assert_eq!(count, 0);
    }
}
