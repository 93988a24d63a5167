// ==========================================
// 表格数据装载 - 配置层
// ==========================================
// 职责: 数据库连接参数、日志过滤器、实体类型（含映射表）声明
// 存储: JSON 配置文件
// ==========================================

pub mod error;
pub mod loader_config;

// 重导出核心配置类型
pub use error::{ConfigError, ConfigResult};
pub use loader_config::{get_default_db_path, DatabaseConfig, LoaderConfig, DB_PATH_ENV};
