// ==========================================
// 表格数据装载 - 装载错误类型
// ==========================================
// 工具: thiserror 派生宏
// 策略: 所有错误均不在本地恢复，直接中止事务并向调用方传播
// ==========================================

use rusqlite::ErrorCode;
use thiserror::Error;

/// 装载错误类型
#[derive(Error, Debug)]
pub enum LoadError {
    // ===== 配置错误 =====
    #[error("实体类型配置错误 (table={table}): {message}")]
    Configuration { table: String, message: String },

    // ===== 自然键解析错误 =====
    #[error("自然键未找到: {table}.{column} = {value}")]
    NotFound {
        table: String,
        column: String,
        value: String,
    },

    #[error("自然键不唯一: {table}.{column} = {value} 匹配多条记录")]
    AmbiguousKey {
        table: String,
        column: String,
        value: String,
    },

    // ===== 输入错误 =====
    #[error("输入格式错误 (行 {row}): {message}")]
    MalformedInput { row: usize, message: String },

    // ===== 数据库错误 =====
    #[error("约束违反: {0}")]
    ConstraintViolation(String),

    #[error("数据库繁忙（事务冲突）: {0}")]
    Busy(String),

    #[error("数据库操作失败: {0}")]
    Database(String),

    #[error("数据库锁获取失败: {0}")]
    Lock(String),
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for LoadError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => LoadError::ConstraintViolation(err.to_string()),
            Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
                LoadError::Busy(err.to_string())
            }
            _ => LoadError::Database(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type LoadResult<T> = Result<T, LoadError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_foreign_key_failure_is_constraint_violation() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;
            CREATE TABLE parent (id INTEGER PRIMARY KEY);
            CREATE TABLE child (id INTEGER PRIMARY KEY, parent_id INTEGER REFERENCES parent(id));
            "#,
        )
        .unwrap();

        let err: LoadError = conn
            .execute("INSERT INTO child (parent_id) VALUES (999)", [])
            .unwrap_err()
            .into();
        assert!(matches!(err, LoadError::ConstraintViolation(_)), "{:?}", err);
    }

    #[test]
    fn test_other_failures_are_database_errors() {
        let conn = Connection::open_in_memory().unwrap();
        let err: LoadError = conn
            .execute("INSERT INTO missing_table VALUES (1)", [])
            .unwrap_err()
            .into();
        assert!(matches!(err, LoadError::Database(_)), "{:?}", err);
    }
}
