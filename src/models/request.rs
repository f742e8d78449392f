use serde::Deserialize;
use std::path::PathBuf;

use crate::models::identity::Identity;

/// 一个待处理的提交请求（对应 `requests_folder` 下的一个 TOML 文件）
///
/// ```toml
/// username = "alice"
/// fasta = """
/// >seq1
/// ACDEFGHIKLMNPQRSTVWY
/// """
/// ```
///
/// 也可以用 `fasta_file = "batch.fasta"` 引用同目录下的序列文件
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionRequest {
    pub username: String,
    #[serde(default)]
    pub fasta: Option<String>,
    #[serde(default)]
    pub fasta_file: Option<PathBuf>,

    /// 原始序列文本，由加载器填充
    #[serde(skip)]
    pub raw: Vec<u8>,
    /// 请求文件路径，由加载器填充
    #[serde(skip)]
    pub file_path: Option<PathBuf>,
}

impl SubmissionRequest {
    /// 用于日志显示的请求名称
    pub fn name(&self) -> String {
        self.file_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.username.clone())
    }
}

/// `users.toml` 的文件结构
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsersFile {
    #[serde(default)]
    pub users: Vec<Identity>,
}
