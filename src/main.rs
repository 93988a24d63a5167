// ==========================================
// 表格数据装载 - 命令行入口
// ==========================================
// 用法: sheet-loader --config loader.json <TABLE> <FILE> [--sheet DATA] [--db path]
// ==========================================

use anyhow::Context;
use clap::Parser;
use sheet_loader::importer::{SheetImporter, SheetImporterImpl};
use sheet_loader::{logging, LoaderConfig};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "sheet-loader")]
#[command(about = "Replace a table's contents with the rows of a CSV/Excel sheet", long_about = None)]
#[command(version)]
struct Cli {
    /// 目标表（须在配置文件中声明）
    table: String,

    /// 输入文件（.csv / .xlsx / .xlsm / .xls / .ods）
    file: PathBuf,

    /// 配置文件（JSON）
    #[arg(short, long, default_value = "sheet_loader.json")]
    config: PathBuf,

    /// 数据库路径（优先于环境变量与配置文件）
    #[arg(long)]
    db: Option<String>,

    /// Excel 工作表名（默认第一个工作表）
    #[arg(short, long)]
    sheet: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = LoaderConfig::from_file(&cli.config)
        .with_context(|| format!("无法加载配置文件: {}", cli.config.display()))?;

    // 初始化日志系统
    logging::init_with(&config.log_filter, config.log_format);

    tracing::info!("系统版本: {}", sheet_loader::VERSION);

    let db_path = config.resolve_db_path(cli.db.as_deref());
    tracing::info!("使用数据库: {}", db_path);

    let importer = SheetImporterImpl::new(Arc::new(config), db_path).with_sheet(cli.sheet);
    let summary = importer
        .import_file(&cli.table, &cli.file)
        .await
        .with_context(|| format!("导入失败: {} → {}", cli.file.display(), cli.table))?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
