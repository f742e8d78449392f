//! 日志工具模块
//!
//! 提供日志初始化和格式化的辅助函数

use anyhow::Result;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing_subscriber::EnvFilter;

/// 初始化 tracing 日志
///
/// 优先使用 `RUST_LOG`，否则 `verbose` 时为 debug，其余为 info。
/// 重复调用不会报错（测试中会多次初始化）
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 初始化日志文件（追加一段带时间的本次运行表头，保留历史记录）
///
/// # 参数
/// - `log_file_path`: 日志文件路径，不存在时创建
pub async fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n提交拒绝记录 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .await?;
    file.write_all(log_header.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符数）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
