// ==========================================
// 表格数据装载 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 值一律参数化；表名/列名统一加引号
// ==========================================

pub mod entity_repo;

// 重导出核心函数
pub use entity_repo::{bulk_insert, count_all, delete_all, find_one_by, quote_ident};
