// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 过滤器: RUST_LOG 优先，其次为配置文件中的 log_filter
// 格式: 文本（默认）/ JSON（便于采集装载批次日志）
// ==========================================

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, EnvFilter};

/// 日志输出格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// 初始化日志系统（文本格式，默认级别 info）
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器
///   例如: RUST_LOG=debug 或 RUST_LOG=sheet_loader::loader=trace
///
/// # 示例
/// ```no_run
/// use sheet_loader::logging;
/// logging::init();
/// ```
pub fn init() {
    init_with("info", LogFormat::Text);
}

/// 按配置初始化日志系统
///
/// # 参数
/// - default_filter: RUST_LOG 未设置时使用的过滤器
/// - format: 输出格式
pub fn init_with(default_filter: &str, format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // 已初始化时 try_init 返回错误，忽略即可
    let _ = match format {
        LogFormat::Text => fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_line_number(true)
            .try_init(),
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .try_init(),
    };
}

/// 初始化测试环境的日志系统
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("sheet_loader=debug"))
        .with_test_writer()
        .try_init();
}
