//! 单个请求处理器 - 编排层
//!
//! ## 职责
//!
//! 处理一个提交请求文件：查找用户 → 交给 `SubmissionPipeline` → 记录结果
//!
//! 1. **身份解析**：按用户名向身份提供方查找
//! 2. **流程调度**：委托 `SubmissionPipeline` 完成校验、配额和写入
//! 3. **拒绝记录**：失败时写入拒绝记录文件
//! 4. **文件清理**：成功后按配置删除请求文件

use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;
use tracing::{error, info, warn};

use crate::infrastructure::{IdentityProvider, SubmissionStore};
use crate::models::request::SubmissionRequest;
use crate::services::RejectionWriter;
use crate::utils::truncate_text;
use crate::workflow::{SubmissionCtx, SubmissionPipeline};

/// 未知用户的错误类别
pub const UNKNOWN_USER_KIND: &str = "unknown_user";

/// 请求处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// 已接受，包含写入的记录数
    Accepted(usize),
    /// 被拒绝，包含错误类别
    Rejected(&'static str),
}

/// 处理单个提交请求
///
/// 被拒绝的请求不算错误，只有基础设施故障（存储故障、写拒绝记录失败、删除文件失败）才返回 `Err`，
/// 存储故障不会写入拒绝记录
pub async fn process_request<S, P>(
    pipeline: &SubmissionPipeline<S>,
    identities: &P,
    rejections: &RejectionWriter,
    request: SubmissionRequest,
    request_index: usize,
    remove_processed: bool,
) -> Result<RequestOutcome>
where
    S: SubmissionStore,
    P: IdentityProvider,
{
    let ctx = SubmissionCtx::new(request_index, request.name(), request.username.clone());
    info!("{} 开始处理 ({} 字节)", ctx, request.raw.len());

    let Some(identity) = identities.find_by_username(&request.username) else {
        warn!("{} ⚠️ 未知用户", ctx);
        rejections
            .write(
                &ctx.request_name,
                &ctx.username,
                UNKNOWN_USER_KIND,
                &format!("Unknown user: {}", ctx.username),
            )
            .await?;
        return Ok(RequestOutcome::Rejected(UNKNOWN_USER_KIND));
    };

    match pipeline.submit_bytes(&identity, &request.raw).await {
        Ok(receipts) => {
            for receipt in &receipts {
                info!("{} ✓ {}", ctx, truncate_text(&receipt.to_string(), 80));
            }

            if remove_processed {
                if let Some(path) = request.file_path.as_deref() {
                    cleanup_file(path, &ctx).await?;
                }
            }

            Ok(RequestOutcome::Accepted(receipts.len()))
        }
        Err(e) if e.is_user_error() => {
            warn!("{} ❌ 提交被拒绝 ({}): {}", ctx, e.kind(), e);
            rejections
                .write(&ctx.request_name, &ctx.username, e.kind(), &e.to_string())
                .await?;
            Ok(RequestOutcome::Rejected(e.kind()))
        }
        Err(e) => {
            error!("{} 存储故障: {}", ctx, e);
            Err(anyhow::Error::from(e).context(format!("{} 提交写入失败", ctx)))
        }
    }
}

/// 删除已处理的请求文件
async fn cleanup_file(path: &Path, ctx: &SubmissionCtx) -> Result<()> {
    if fs::try_exists(path).await.unwrap_or(false) {
        fs::remove_file(path)
            .await
            .with_context(|| format!("无法删除文件: {}", path.display()))?;
        info!("{} 🗑️ 请求文件已删除", ctx);
    } else {
        warn!("{} ⚠️ 请求文件不存在: {}", ctx, path.display());
    }

    Ok(())
}
