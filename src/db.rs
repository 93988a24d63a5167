// ==========================================
// 表格数据装载 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，保证外键约束在每个连接上生效
// - 统一 busy_timeout，并发装载时由 SQLite 排队而不是立即失败
// ==========================================

use crate::config::DatabaseConfig;
use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    configure_sqlite_connection_with(conn, &DatabaseConfig::default())
}

/// 按配置应用 PRAGMA
pub fn configure_sqlite_connection_with(
    conn: &Connection,
    config: &DatabaseConfig,
) -> rusqlite::Result<()> {
    let foreign_keys = if config.foreign_keys { "ON" } else { "OFF" };
    conn.execute_batch(&format!("PRAGMA foreign_keys = {};", foreign_keys))?;
    conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 打开 SQLite 连接并应用指定配置
pub fn open_sqlite_connection_with(
    db_path: &str,
    config: &DatabaseConfig,
) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection_with(&conn, config)?;
    Ok(conn)
}
