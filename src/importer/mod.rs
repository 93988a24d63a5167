// ==========================================
// 表格数据装载 - 导入层
// ==========================================
// 职责: 外部文件 → 原始行 → 批量装载
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod error;
pub mod file_parser;
pub mod sheet_importer_impl;
pub mod sheet_importer_trait;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileParser, UniversalFileParser};
pub use sheet_importer_impl::SheetImporterImpl;
pub use sheet_importer_trait::SheetImporter;
