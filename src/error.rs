use thiserror::Error;

use crate::models::submission::SubmissionId;

/// 提交失败原因
///
/// 除 `Store` 外都是用户输入或策略问题，修改输入后重新提交即可。
/// `Display` 的内容可以直接展示给用户
#[derive(Debug, Error)]
pub enum SubmitError {
    /// 输入无法作为文本解析
    #[error("Error parsing FASTA format: {cause}")]
    ParseError { cause: String },

    /// 没有解析出任何记录
    #[error("No valid sequences found. Please check your FASTA format.")]
    NoSequences,

    /// 单次提交记录过多
    #[error("Maximum {max} sequences allowed per submission.")]
    TooManySequences { count: usize, max: usize },

    /// 序列为空
    #[error("Sequence {index} ({label}) is empty.")]
    EmptySequence { index: usize, label: String },

    /// 序列过长
    #[error("Sequence {index} ({label}) is too long. Maximum {max} amino acids allowed.")]
    TooLong {
        index: usize,
        label: String,
        length: usize,
        max: usize,
    },

    /// 序列含非法字符
    #[error("Sequence {index} ({label}) contains invalid characters. Only amino acid letters (ACDEFGHIKLMNPQRSTVWY) are allowed.")]
    InvalidAlphabet {
        index: usize,
        label: String,
        invalid: char,
    },

    /// 邮箱未验证
    #[error("You must verify your email address before submitting sequences.")]
    EmailNotVerified,

    /// 超出每日配额，`remaining` 可能为负，显示时截断为 0
    #[error("Daily limit exceeded. You can submit {} more sequences today.", clamp_remaining(.remaining))]
    QuotaExceeded { remaining: i64 },

    /// 存储层错误
    #[error("Submission store error: {0}")]
    Store(#[from] StoreError),
}

fn clamp_remaining(remaining: &i64) -> i64 {
    (*remaining).max(0)
}

impl SubmitError {
    /// 稳定的错误类别标识
    pub fn kind(&self) -> &'static str {
        match self {
            SubmitError::ParseError { .. } => "parse_error",
            SubmitError::NoSequences => "no_sequences",
            SubmitError::TooManySequences { .. } => "too_many_sequences",
            SubmitError::EmptySequence { .. } => "empty_sequence",
            SubmitError::TooLong { .. } => "too_long",
            SubmitError::InvalidAlphabet { .. } => "invalid_alphabet",
            SubmitError::EmailNotVerified => "email_not_verified",
            SubmitError::QuotaExceeded { .. } => "quota_exceeded",
            SubmitError::Store(_) => "store_error",
        }
    }

    /// 是否为用户可修正的输入/策略错误
    pub fn is_user_error(&self) -> bool {
        !matches!(self, SubmitError::Store(_))
    }
}

/// 存储层错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Submission {0} not found")]
    NotFound(SubmissionId),

    #[error("Submission {0} has already been scored")]
    AlreadyScored(SubmissionId),

    /// 写入前的防御性校验失败
    #[error("Refusing to store invalid sequence {sequence:?}: {reason}")]
    InvalidSequence { sequence: String, reason: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("File not found: {path}")]
    NotFound { path: String },

    /// 读取文件失败
    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: String,
        source: std::io::Error,
    },

    /// 写入文件失败
    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: String,
        source: std::io::Error,
    },

    /// TOML 解析失败
    #[error("Failed to parse TOML {path}: {source}")]
    TomlParseFailed {
        path: String,
        source: toml::de::Error,
    },

    /// 缺少必要字段
    #[error("{path}: missing field `{field}`")]
    MissingField { path: String, field: String },

    /// 目录不存在
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("Environment variable {var_name}: value '{value}' is not a valid {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },

    /// 配置值不合法
    #[error("Invalid configuration `{key}`: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("File error: {0}")]
    File(#[from] FileError),

    #[error("Submission rejected: {0}")]
    Submit(#[from] SubmitError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Other(String),
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建配置值错误
    pub fn invalid_config(key: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Config(ConfigError::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        })
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
