//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，不做具体的校验判断。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量请求处理器
//! - 管理应用生命周期（初始化、运行）
//! - 批量加载请求（Vec<SubmissionRequest>）
//! - 控制并发数量（Semaphore）
//! - 输出全局统计信息
//!
//! ### `request_processor` - 单个请求处理器
//! - 查找提交者身份
//! - 委托 SubmissionPipeline 处理
//! - 记录拒绝原因、清理文件
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<SubmissionRequest>)
//!     ↓
//! request_processor (处理单个请求)
//!     ↓
//! workflow::SubmissionPipeline (解析 → 校验 → 配额 → 写入)
//!     ↓
//! services (能力层：parser / validators / quota / rejections)
//!     ↓
//! infrastructure (基础设施：SubmissionStore / IdentityProvider)
//! ```

pub mod batch_processor;
pub mod request_processor;

pub use batch_processor::{App, ProcessingStats};
pub use request_processor::{process_request, RequestOutcome};
