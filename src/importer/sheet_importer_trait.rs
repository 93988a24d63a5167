// ==========================================
// 表格数据装载 - 表格导入 Trait
// ==========================================
// 职责: 定义“文件 → 目标表全量替换”的异步导入接口（不包含实现）
// ==========================================

use crate::domain::{LoadSummary, TransformedRecord};
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use std::path::Path;

// ==========================================
// SheetImporter Trait
// ==========================================
// 用途: 表格导入主接口
// 实现者: SheetImporterImpl
#[async_trait]
pub trait SheetImporter: Send + Sync {
    /// 从文件导入并全量替换目标表
    ///
    /// # 参数
    /// - table: 目标实体类型（表名，须在配置中声明）
    /// - file_path: CSV / Excel 文件路径
    ///
    /// # 返回
    /// - Ok(LoadSummary): 装载结果
    /// - Err: 文件错误、配置错误、装载错误（装载错误时目标表保持不变）
    async fn import_file<P: AsRef<Path> + Send>(
        &self,
        table: &str,
        file_path: P,
    ) -> ImportResult<LoadSummary>;

    /// 从文件导入并全量替换目标表（带预处理钩子）
    ///
    /// # 说明
    /// - preprocess 在阻塞线程中执行，每条记录调用一次
    async fn import_file_with<P, F>(
        &self,
        table: &str,
        file_path: P,
        preprocess: F,
    ) -> ImportResult<LoadSummary>
    where
        P: AsRef<Path> + Send,
        F: FnMut(&mut TransformedRecord) + Send + 'static;
}
