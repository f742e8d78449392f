//! 拒绝记录服务 - 业务能力层
//!
//! 只负责"把被拒绝的提交写入日志文件"，不关心流程

use anyhow::Result;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

/// 拒绝记录写入服务
///
/// 每行一条：请求名 | 用户 | 错误类别 | 错误信息
pub struct RejectionWriter {
    file_path: String,
    write_lock: Mutex<()>,
}

impl RejectionWriter {
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &str {
        &self.file_path
    }

    /// 追加一条拒绝记录
    pub async fn write(&self, request: &str, username: &str, kind: &str, message: &str) -> Result<()> {
        debug!("写入拒绝记录: {} | {} | {}", request, username, kind);

        let line = format!(
            "{} | {} | {} | {}\n",
            request,
            username,
            kind,
            message.replace('\n', " ")
        );

        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_appends_lines() {
        let path = std::env::temp_dir().join(format!(
            "sequence_submit_rejections_{}.txt",
            std::process::id()
        ));
        let _ = tokio::fs::remove_file(&path).await;

        let writer = RejectionWriter::new(path.to_string_lossy());
        writer
            .write("a.toml", "alice", "no_sequences", "No valid sequences found.")
            .await
            .unwrap();
        writer
            .write("b.toml", "bob", "email_not_verified", "multi\nline")
            .await
            .unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "a.toml | alice | no_sequences | No valid sequences found.",
                "b.toml | bob | email_not_verified | multi line",
            ]
        );
    }
}
