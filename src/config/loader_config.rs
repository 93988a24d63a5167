// ==========================================
// 表格数据装载 - 装载配置
// ==========================================
// 职责: 加载 JSON 配置，提供实体类型注册表与数据库路径解析
// 路径优先级: 命令行参数 > 环境变量 > 配置文件 > 用户数据目录默认值
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::db::DEFAULT_BUSY_TIMEOUT_MS;
use crate::domain::EntitySchema;
use crate::logging::LogFormat;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "SHEET_LOADER_DB_PATH";

fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

fn default_true() -> bool {
    true
}

fn default_log_filter() -> String {
    "info".to_string()
}

// ==========================================
// DatabaseConfig - 数据库连接参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    #[serde(default = "default_true")]
    pub foreign_keys: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            foreign_keys: true,
        }
    }
}

// ==========================================
// LoaderConfig - 装载配置
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default)]
    pub entities: Vec<EntitySchema>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            log_filter: default_log_filter(),
            log_format: LogFormat::default(),
            entities: Vec::new(),
        }
    }
}

impl LoaderConfig {
    /// 从 JSON 文件加载配置并校验
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&raw)
    }

    /// 从 JSON 字符串加载配置并校验
    pub fn from_json_str(raw: &str) -> ConfigResult<Self> {
        let config: LoaderConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// 校验所有实体类型（映射表可用、表名不重复）
    pub fn validate(&self) -> ConfigResult<()> {
        let mut seen = HashSet::new();
        for schema in &self.entities {
            if !seen.insert(schema.table.as_str()) {
                return Err(ConfigError::DuplicateEntity(schema.table.clone()));
            }
            schema.validate()?;
        }
        Ok(())
    }

    /// 按表名查找实体类型
    pub fn entity(&self, table: &str) -> ConfigResult<&EntitySchema> {
        self.entities
            .iter()
            .find(|s| s.table == table)
            .ok_or_else(|| ConfigError::UnknownEntity(table.to_string()))
    }

    /// 解析数据库路径
    ///
    /// # 参数
    /// - override_path: 命令行显式指定的路径（最高优先级）
    pub fn resolve_db_path(&self, override_path: Option<&str>) -> String {
        if let Some(path) = override_path.map(str::trim).filter(|p| !p.is_empty()) {
            return path.to_string();
        }

        if let Ok(path) = std::env::var(DB_PATH_ENV) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }

        match self.database.path.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => path.to_string(),
            _ => get_default_db_path(),
        }
    }
}

/// 默认数据库路径（用户数据目录）
pub fn get_default_db_path() -> String {
    let mut path = PathBuf::from("./sheet_loader.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("sheet-loader");
        // 确保目录存在
        std::fs::create_dir_all(&dir).ok();
        path = dir.join("sheet_loader.db");
    }

    path.to_string_lossy().to_string()
}
