// ==========================================
// 表格数据装载 - 领域模型层
// ==========================================
// 职责: 定义原始行、实体类型（映射表）、转换记录与实体
// 红线: 不含数据访问逻辑
// ==========================================

pub mod cell;
pub mod record;
pub mod schema;

// 重导出核心类型
pub use cell::{column_letter, Cell, CellValue, RawRow};
pub use record::{Entity, LoadSummary, TransformedRecord};
pub use schema::{ColumnDef, EntitySchema, FieldDescriptor, ForeignKeyRef, FOREIGN_KEY_SUFFIX};
