//! # Sequence Submit
//!
//! 氨基酸序列提交服务：解析用户提交的 FASTA 文本，校验格式与每日配额，
//! 通过后写入待评分队列
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有共享资源，只暴露能力
//! - `SubmissionStore` - 提交记录存储（`MemoryStore` / `JsonFileStore`），提供按用户加锁
//! - `IdentityProvider` - 用户身份查询
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `parse_fasta` - FASTA 解析
//! - `validate_records` / `validate_batch` - 记录与整批校验
//! - `QuotaEnforcer` - 邮箱验证与每日配额
//! - `RejectionWriter` - 写拒绝记录
//!
//! ### ③ 流程层（Workflow）
//! - `SubmissionPipeline` - 一次提交的完整流程（验证 → 解析 → 校验 → 配额 → 写入）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量请求处理器，管理资源和并发
//! - `orchestrator/request_processor` - 单个请求处理器
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult, StoreError, SubmitError};
pub use infrastructure::{
    IdentityProvider, JsonFileStore, MemoryStore, StaticIdentityProvider, SubmissionStore,
};
pub use models::{Identity, Record, Submission, SubmissionLimits, SubmissionReceipt, SubmissionStatus};
pub use orchestrator::{App, ProcessingStats};
pub use services::parse_fasta;
pub use workflow::{SubmissionCtx, SubmissionPipeline};
