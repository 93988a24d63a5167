// ==========================================
// 表格数据装载 - 装载核心
// ==========================================
// 流程: 表头映射 → 字段解析 → 行转换（含预处理）→ 事务化批量替换
// ==========================================

pub mod bulk_loader;
pub mod column_mapper;
pub mod error;
pub mod field_resolver;
pub mod row_transformer;

// 重导出核心类型
pub use bulk_loader::BulkLoader;
pub use column_mapper::{ColumnMap, ColumnMapper, ColumnSlot};
pub use error::{LoadError, LoadResult};
pub use field_resolver::{FieldResolve, FieldResolver, KeyLookup};
pub use row_transformer::{RowTransformer, TransformedRows};
