// ==========================================
// 表格数据装载 - 表格导入器实现
// ==========================================
// 职责: 整合导入流程，从文件到数据库
// 流程: 查找实体类型 → 解析文件 → 事务化全量替换
// 并发: 每次导入在阻塞线程上使用独立连接；同表并发由 SQLite 写锁串行化
// ==========================================

use crate::config::LoaderConfig;
use crate::domain::{LoadSummary, TransformedRecord};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::sheet_importer_trait::SheetImporter;
use crate::loader::BulkLoader;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, instrument};

// ==========================================
// SheetImporterImpl - 表格导入器实现
// ==========================================
pub struct SheetImporterImpl {
    config: Arc<LoaderConfig>,
    db_path: String,
    sheet: Option<String>, // Excel 工作表名
}

impl SheetImporterImpl {
    /// 创建新的 SheetImporter 实例
    ///
    /// # 参数
    /// - config: 装载配置（实体类型注册表 + 数据库参数）
    /// - db_path: 数据库文件路径
    pub fn new(config: Arc<LoaderConfig>, db_path: impl Into<String>) -> Self {
        Self {
            config,
            db_path: db_path.into(),
            sheet: None,
        }
    }

    /// 指定 Excel 工作表
    pub fn with_sheet(mut self, sheet: Option<String>) -> Self {
        self.sheet = sheet;
        self
    }

    pub fn db_path(&self) -> &str {
        &self.db_path
    }
}

#[async_trait]
impl SheetImporter for SheetImporterImpl {
    async fn import_file<P: AsRef<Path> + Send>(
        &self,
        table: &str,
        file_path: P,
    ) -> ImportResult<LoadSummary> {
        self.import_file_with(table, file_path, |_: &mut TransformedRecord| {})
            .await
    }

    #[instrument(skip(self, file_path, preprocess))]
    async fn import_file_with<P, F>(
        &self,
        table: &str,
        file_path: P,
        preprocess: F,
    ) -> ImportResult<LoadSummary>
    where
        P: AsRef<Path> + Send,
        F: FnMut(&mut TransformedRecord) + Send + 'static,
    {
        let schema = self.config.entity(table)?.clone();
        let path = file_path.as_ref().to_path_buf();
        let db_path = self.db_path.clone();
        let db_config = self.config.database.clone();
        let sheet = self.sheet.clone();

        info!(file_path = %path.display(), db_path = %db_path, "开始导入");

        let result = tokio::task::spawn_blocking(move || -> ImportResult<LoadSummary> {
            let rows = UniversalFileParser::with_sheet(sheet).parse(&path)?;
            info!(total_rows = rows.len(), "文件解析完成");

            let loader = BulkLoader::open(&db_path, &db_config)?;
            Ok(loader.load_with(&schema, rows, preprocess)?)
        })
        .await
        .map_err(|e| ImportError::TaskJoin(e.to_string()))?;

        match &result {
            Ok(summary) => info!(
                load_id = %summary.load_id,
                deleted = summary.deleted,
                inserted = summary.inserted,
                "导入完成"
            ),
            Err(e) => error!(error = %e, "导入失败"),
        }

        result
    }
}
