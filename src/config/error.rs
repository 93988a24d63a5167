// ==========================================
// 表格数据装载 - 配置错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::loader::error::LoadError;
use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {message}")]
    ReadError { path: String, message: String },

    #[error("配置文件解析失败: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("未声明的实体类型: {0}")]
    UnknownEntity(String),

    #[error("实体类型重复声明: {0}")]
    DuplicateEntity(String),

    #[error("实体类型无效: {0}")]
    InvalidEntity(#[from] LoadError),
}

/// Result 类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
