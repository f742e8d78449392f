//! 批量请求处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量提交请求的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：打开提交存储、加载用户表、初始化拒绝记录文件
//! 2. **批量加载**：扫描并加载所有待处理的请求（`Vec<SubmissionRequest>`）
//! 3. **并发控制**：使用 Semaphore 限制同时处理的请求数量
//! 4. **分批处理**：将请求分批次处理，每批完成后再开始下一批
//! 5. **全局统计**：汇总所有请求的处理结果
//!
//! 同一用户的多个请求可能被并发处理，配额由 `SubmissionPipeline` 的用户锁保证

use anyhow::{Context, Result};
use futures::future::join_all;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::infrastructure::{JsonFileStore, StaticIdentityProvider};
use crate::models::request::SubmissionRequest;
use crate::orchestrator::request_processor::{self, RequestOutcome};
use crate::services::RejectionWriter;
use crate::utils::logging::init_log_file;
use crate::workflow::SubmissionPipeline;

/// 应用主结构
pub struct App {
    config: Config,
    pipeline: Arc<SubmissionPipeline<JsonFileStore>>,
    identities: Arc<StaticIdentityProvider>,
    rejections: Arc<RejectionWriter>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate()?;

        // 初始化拒绝记录文件
        init_log_file(&config.rejections_file)
            .await
            .with_context(|| format!("无法初始化拒绝记录文件: {}", config.rejections_file))?;

        log_startup(&config);

        let store = JsonFileStore::open(&config.store_path)
            .await
            .with_context(|| format!("无法打开提交存储: {}", config.store_path))?;

        let identities = StaticIdentityProvider::from_toml_file(Path::new(&config.users_file))
            .await
            .with_context(|| format!("无法加载用户表: {}", config.users_file))?;

        let pipeline = SubmissionPipeline::new(
            Arc::new(store),
            config.limits()?,
            config.quota_zone()?,
        );

        Ok(Self {
            rejections: Arc::new(RejectionWriter::new(config.rejections_file.clone())),
            pipeline: Arc::new(pipeline),
            identities: Arc::new(identities),
            config,
        })
    }

    /// 提交流程（供评分服务等外部协作方查询存储）
    pub fn pipeline(&self) -> &SubmissionPipeline<JsonFileStore> {
        &self.pipeline
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<ProcessingStats> {
        let all_requests = self.load_requests().await?;

        if all_requests.is_empty() {
            warn!("⚠️ 没有找到待处理的请求文件，程序结束");
            return Ok(ProcessingStats::default());
        }

        log_requests_loaded(all_requests.len(), self.config.max_concurrent_requests);

        let stats = self.process_all_requests(all_requests).await?;

        print_final_stats(&stats, &self.config);

        Ok(stats)
    }

    /// 加载请求
    async fn load_requests(&self) -> Result<Vec<SubmissionRequest>> {
        info!("📁 正在扫描待处理的请求...");
        let requests = crate::models::load_all_requests(&self.config.requests_folder).await?;
        Ok(requests)
    }

    /// 处理所有请求
    async fn process_all_requests(&self, all_requests: Vec<SubmissionRequest>) -> Result<ProcessingStats> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_requests));
        let batch_size = self.config.max_concurrent_requests;
        let total_requests = all_requests.len();
        let total_batches = total_requests.div_ceil(batch_size);
        let mut stats = ProcessingStats {
            total: total_requests,
            ..Default::default()
        };

        let mut remaining = all_requests.into_iter();
        for batch_num in 1..=total_batches {
            let batch: Vec<SubmissionRequest> = remaining.by_ref().take(batch_size).collect();
            let batch_start = (batch_num - 1) * batch_size;

            log_batch_start(
                batch_num,
                total_batches,
                batch_start + 1,
                batch_start + batch.len(),
                total_requests,
            );

            let batch_stats = self
                .process_batch(batch, batch_start, semaphore.clone())
                .await?;

            log_batch_complete(batch_num, &batch_stats);
            stats.merge(&batch_stats);
        }

        Ok(stats)
    }

    /// 处理单个批次
    async fn process_batch(
        &self,
        batch: Vec<SubmissionRequest>,
        batch_start: usize,
        semaphore: Arc<Semaphore>,
    ) -> Result<ProcessingStats> {
        let mut handles = Vec::with_capacity(batch.len());
        let mut indices = Vec::with_capacity(batch.len());

        for (idx, request) in batch.into_iter().enumerate() {
            let request_index = batch_start + idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;

            let pipeline = self.pipeline.clone();
            let identities = self.identities.clone();
            let rejections = self.rejections.clone();
            let remove_processed = self.config.remove_processed;

            indices.push(request_index);
            handles.push(tokio::spawn(async move {
                let _permit = permit;
                request_processor::process_request(
                    pipeline.as_ref(),
                    identities.as_ref(),
                    rejections.as_ref(),
                    request,
                    request_index,
                    remove_processed,
                )
                .await
            }));
        }

        let mut result = ProcessingStats {
            total: handles.len(),
            ..Default::default()
        };

        for (request_index, joined) in indices.into_iter().zip(join_all(handles).await) {
            match joined {
                Ok(Ok(RequestOutcome::Accepted(count))) => {
                    result.accepted += 1;
                    result.sequences += count;
                }
                Ok(Ok(RequestOutcome::Rejected(_))) => {
                    result.rejected += 1;
                }
                Ok(Err(e)) => {
                    error!("[请求 #{}] ❌ 处理过程中发生错误: {:#}", request_index, e);
                    result.failed += 1;
                }
                Err(e) => {
                    error!("[请求 #{}] 任务执行失败: {}", request_index, e);
                    result.failed += 1;
                }
            }
        }

        Ok(result)
    }
}

/// 处理统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessingStats {
    /// 请求总数
    pub total: usize,
    /// 被接受的请求数
    pub accepted: usize,
    /// 被拒绝的请求数
    pub rejected: usize,
    /// 处理过程中出错的请求数
    pub failed: usize,
    /// 写入的序列条数
    pub sequences: usize,
}

impl ProcessingStats {
    fn merge(&mut self, other: &ProcessingStats) {
        self.accepted += other.accepted;
        self.rejected += other.rejected;
        self.failed += other.failed;
        self.sequences += other.sequences;
    }
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 序列提交处理");
    info!("📊 最大并发数: {}", config.max_concurrent_requests);
    info!(
        "🧪 单次最多 {} 条序列，每条最长 {}，每日配额 {} (UTC{:+} 分钟)",
        config.max_sequences_per_batch,
        config.max_sequence_length,
        config.daily_quota,
        config.quota_utc_offset_minutes
    );
    info!("{}", "=".repeat(60));
}

fn log_requests_loaded(total: usize, max_concurrent: usize) {
    info!("✓ 找到 {} 个待处理的请求", total);
    info!("📋 将以每批 {} 个的方式处理", max_concurrent);
}

fn log_batch_start(batch_num: usize, total_batches: usize, start: usize, end: usize, total: usize) {
    info!("{}", "=".repeat(60));
    info!("📦 开始处理第 {}/{} 批", batch_num, total_batches);
    info!("📄 本批请求: {}-{} / 共 {} 个", start, end, total);
    info!("{}", "=".repeat(60));
}

fn log_batch_complete(batch_num: usize, result: &ProcessingStats) {
    info!("{}", "─".repeat(60));
    info!(
        "✓ 第 {} 批完成: 接受 {}/{}，拒绝 {}，出错 {}",
        batch_num, result.accepted, result.total, result.rejected, result.failed
    );
    info!("{}", "─".repeat(60));
}

fn print_final_stats(stats: &ProcessingStats, config: &Config) {
    info!("{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 接受: {}/{} (共 {} 条序列)", stats.accepted, stats.total, stats.sequences);
    info!("🚫 拒绝: {}", stats.rejected);
    info!("❌ 出错: {}", stats.failed);
    info!("{}", "=".repeat(60));
    info!("拒绝记录已保存至: {}", config.rejections_file);
}
