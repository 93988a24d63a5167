// ==========================================
// 表格数据装载 - 核心库
// ==========================================
// 职责: 表头 + 数据行 → 关系表的事务化全量替换
// 技术栈: Rust + SQLite
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 原始行 / 实体类型 / 记录
pub mod domain;

// 装载核心 - 映射 / 解析 / 转换 / 事务
pub mod loader;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部文件
pub mod importer;

// 配置层
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

pub use domain::{
    Cell, CellValue, ColumnDef, Entity, EntitySchema, FieldDescriptor, ForeignKeyRef,
    LoadSummary, RawRow, TransformedRecord,
};

pub use loader::{BulkLoader, LoadError, LoadResult};

pub use importer::{ImportError, ImportResult, SheetImporter, SheetImporterImpl};

pub use config::{ConfigError, LoaderConfig};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "sheet-loader";
