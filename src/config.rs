use chrono::FixedOffset;
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{AppError, AppResult, ConfigError, FileError};
use crate::models::amino_acid::MAX_SEQUENCE_LENGTH;
use crate::models::limits::SubmissionLimits;

/// 指定配置文件路径的环境变量
pub const CONFIG_FILE_ENV: &str = "SEQUENCE_SUBMIT_CONFIG";

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 同时处理的请求数量
    pub max_concurrent_requests: usize,
    /// 待处理请求（TOML）所在目录
    pub requests_folder: String,
    /// 提交存储文件
    pub store_path: String,
    /// 用户表文件
    pub users_file: String,
    /// 拒绝记录文件
    pub rejections_file: String,
    /// 处理成功后删除请求文件
    pub remove_processed: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- 配额与校验 ---
    /// 计算"今天"使用的时区，相对 UTC 的分钟数
    pub quota_utc_offset_minutes: i32,
    pub daily_quota: usize,
    pub max_sequences_per_batch: usize,
    pub max_sequence_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 8,
            requests_folder: "requests".to_string(),
            store_path: "data/submissions.json".to_string(),
            users_file: "users.toml".to_string(),
            rejections_file: "rejections.txt".to_string(),
            remove_processed: false,
            verbose_logging: false,
            quota_utc_offset_minutes: 0,
            daily_quota: 10,
            max_sequences_per_batch: 10,
            max_sequence_length: MAX_SEQUENCE_LENGTH,
        }
    }
}

impl Config {
    /// 加载配置：默认值 → 配置文件（若设置了 `SEQUENCE_SUBMIT_CONFIG`）→ 环境变量
    pub fn load() -> AppResult<Self> {
        let base = match std::env::var(CONFIG_FILE_ENV) {
            Ok(path) => Self::from_toml_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        let config = base.overlay_env()?;
        config.validate()?;
        Ok(config)
    }

    /// 仅从环境变量加载，未设置的项使用默认值
    pub fn from_env() -> AppResult<Self> {
        Self::default().overlay_env()
    }

    /// 从 TOML 文件加载，缺失的项使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            AppError::File(FileError::TomlParseFailed {
                path: path.display().to_string(),
                source: e,
            })
        })?;

        info!("已加载配置文件: {}", path.display());
        Ok(config)
    }

    /// 用环境变量覆盖当前配置
    pub fn overlay_env(self) -> AppResult<Self> {
        Ok(Self {
            max_concurrent_requests: env_parse(
                "MAX_CONCURRENT_REQUESTS",
                self.max_concurrent_requests,
            )?,
            requests_folder: env_string("REQUESTS_FOLDER", self.requests_folder),
            store_path: env_string("STORE_PATH", self.store_path),
            users_file: env_string("USERS_FILE", self.users_file),
            rejections_file: env_string("REJECTIONS_FILE", self.rejections_file),
            remove_processed: env_parse("REMOVE_PROCESSED", self.remove_processed)?,
            verbose_logging: env_parse("VERBOSE_LOGGING", self.verbose_logging)?,
            quota_utc_offset_minutes: env_parse(
                "QUOTA_UTC_OFFSET_MINUTES",
                self.quota_utc_offset_minutes,
            )?,
            daily_quota: env_parse("DAILY_QUOTA", self.daily_quota)?,
            max_sequences_per_batch: env_parse(
                "MAX_SEQUENCES_PER_BATCH",
                self.max_sequences_per_batch,
            )?,
            max_sequence_length: env_parse("MAX_SEQUENCE_LENGTH", self.max_sequence_length)?,
        })
    }

    /// 检查配置之间的约束
    pub fn validate(&self) -> AppResult<()> {
        self.quota_zone()?;
        self.limits()?;
        if self.max_concurrent_requests == 0 {
            return Err(AppError::invalid_config(
                "max_concurrent_requests",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// 配额时区
    pub fn quota_zone(&self) -> Result<FixedOffset, ConfigError> {
        self.quota_utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "quota_utc_offset_minutes".to_string(),
                reason: format!(
                    "{} is outside the range of a UTC offset",
                    self.quota_utc_offset_minutes
                ),
            })
    }

    /// 校验上限
    pub fn limits(&self) -> Result<SubmissionLimits, ConfigError> {
        if self.max_sequence_length == 0 || self.max_sequence_length > MAX_SEQUENCE_LENGTH {
            return Err(ConfigError::InvalidValue {
                key: "max_sequence_length".to_string(),
                reason: format!("must be between 1 and {MAX_SEQUENCE_LENGTH}"),
            });
        }
        if self.max_sequences_per_batch == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_sequences_per_batch".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(SubmissionLimits {
            max_sequences_per_batch: self.max_sequences_per_batch,
            max_sequence_length: self.max_sequence_length,
            daily_quota: self.daily_quota,
        })
    }
}

fn env_string(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value.trim().parse().map_err(|_| {
            warn!("环境变量 {} 的值无效: {}", key, value);
            ConfigError::EnvVarParseFailed {
                var_name: key.to_string(),
                value,
                expected_type: std::any::type_name::<T>().to_string(),
            }
        }),
        Err(_) => Ok(default),
    }
}
