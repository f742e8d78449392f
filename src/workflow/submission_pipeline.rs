//! 提交流程 - 流程层
//!
//! 核心职责：定义"一次提交"的完整处理流程
//!
//! 流程顺序：
//! 1. 邮箱验证
//! 2. 解析 FASTA
//! 3. 整批数量检查（空 / 过多）
//! 4. 逐条记录检查
//! 5. 获取用户锁 → 每日配额检查 → 批量写入 `pending` 记录
//!
//! 任何一步失败都立即返回，写入之前不会改动任何状态

use chrono::{DateTime, FixedOffset, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::SubmitError;
use crate::infrastructure::store::SubmissionStore;
use crate::models::identity::Identity;
use crate::models::limits::SubmissionLimits;
use crate::models::submission::SubmissionReceipt;
use crate::services::{parse_fasta, validate_batch, validate_records, QuotaEnforcer};

/// 提交流程
///
/// - 编排解析、校验、配额、写入的顺序
/// - 不持有除存储以外的任何可变状态，可以在多个任务间共享
pub struct SubmissionPipeline<S> {
    store: Arc<S>,
    limits: SubmissionLimits,
    quota: QuotaEnforcer,
}

impl<S: SubmissionStore> SubmissionPipeline<S> {
    /// 创建提交流程，`zone` 为计算每日配额使用的时区
    pub fn new(store: Arc<S>, limits: SubmissionLimits, zone: FixedOffset) -> Self {
        Self {
            store,
            limits,
            quota: QuotaEnforcer::new(limits.daily_quota, zone),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn limits(&self) -> SubmissionLimits {
        self.limits
    }

    pub fn quota(&self) -> &QuotaEnforcer {
        &self.quota
    }

    /// 以当前时间提交
    pub async fn submit(
        &self,
        identity: &Identity,
        raw_text: &str,
    ) -> Result<Vec<SubmissionReceipt>, SubmitError> {
        self.submit_at(identity, raw_text, Utc::now()).await
    }

    /// 提交原始字节，非 UTF-8 输入报告为 `ParseError`
    pub async fn submit_bytes(
        &self,
        identity: &Identity,
        raw: &[u8],
    ) -> Result<Vec<SubmissionReceipt>, SubmitError> {
        QuotaEnforcer::require_verified(identity)?;

        let text = std::str::from_utf8(raw).map_err(|e| SubmitError::ParseError {
            cause: e.to_string(),
        })?;

        self.submit(identity, text).await
    }

    /// 以指定时间提交（`now` 同时作为配额日期和记录的提交时间）
    pub async fn submit_at(
        &self,
        identity: &Identity,
        raw_text: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<SubmissionReceipt>, SubmitError> {
        // 1. 邮箱验证
        QuotaEnforcer::require_verified(identity)?;

        // 2. 解析
        let records = parse_fasta(raw_text);
        debug!("用户 {} 的提交解析出 {} 条记录", identity, records.len());

        // 3. 整批检查
        validate_batch(&records, self.limits.max_sequences_per_batch)?;

        // 4. 逐条检查
        validate_records(&records, self.limits.max_sequence_length)?;

        // 5. 配额检查与写入在同一把用户锁内完成
        let _guard = self.store.lock_identity(identity.id).await;

        let usage = self
            .quota
            .authorize(self.store.as_ref(), identity, records.len(), now)
            .await?;

        let payloads: Vec<String> = records.iter().map(|r| r.payload.clone()).collect();
        let created = self
            .store
            .insert_submissions(identity.id, &payloads, now)
            .await?;

        info!(
            "✓ 用户 {} 提交了 {} 条序列，今日剩余 {} 条",
            identity,
            created.len(),
            usage.remaining
        );

        Ok(created
            .iter()
            .zip(&records)
            .map(|(submission, record)| SubmissionReceipt::new(submission, record.label.as_str()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory_store::MemoryStore;
    use crate::models::submission::SubmissionStatus;
    use chrono::TimeZone;

    fn pipeline() -> SubmissionPipeline<MemoryStore> {
        SubmissionPipeline::new(
            Arc::new(MemoryStore::new()),
            SubmissionLimits::default(),
            FixedOffset::east_opt(0).unwrap(),
        )
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 29, 12, 0, 0).unwrap()
    }

    fn fasta(n: usize) -> String {
        (1..=n).map(|i| format!(">s{i}\nACDEFGHIK\n")).collect()
    }

    #[tokio::test]
    async fn test_single_record_is_persisted_pending() {
        let pipeline = pipeline();
        let alice = Identity::new(1, "alice", true);

        let receipts = pipeline
            .submit_at(&alice, ">my protein\nacde fghi", noon())
            .await
            .unwrap();
        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].label, "my protein");
        assert_eq!(receipts[0].status, SubmissionStatus::Pending);

        let stored = pipeline.store().list_submissions(alice.id).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].sequence, "ACDEFGHI");
        assert_eq!(stored[0].result, 0.0);
        assert_eq!(stored[0].submit_date, noon());
    }

    #[tokio::test]
    async fn test_too_many_sequences_wins_over_record_errors() {
        let pipeline = pipeline();
        let alice = Identity::new(1, "alice", true);
        let text: String = (1..=11).map(|i| format!(">s{i}\nBBBB\n")).collect();

        let err = pipeline.submit_at(&alice, &text, noon()).await.unwrap_err();
        assert!(matches!(err, SubmitError::TooManySequences { count: 11, max: 10 }));
        assert!(pipeline.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_failing_record_persists_nothing() {
        let pipeline = pipeline();
        let alice = Identity::new(1, "alice", true);
        let text = format!(">ok\nACDE\n>long\n{}\n", "A".repeat(131));

        let err = pipeline.submit_at(&alice, &text, noon()).await.unwrap_err();
        assert!(matches!(err, SubmitError::TooLong { index: 2, .. }));
        assert!(pipeline.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_quota_boundary() {
        let pipeline = pipeline();
        let alice = Identity::new(1, "alice", true);

        pipeline.submit_at(&alice, &fasta(8), noon()).await.unwrap();

        let err = pipeline.submit_at(&alice, &fasta(3), noon()).await.unwrap_err();
        assert!(matches!(err, SubmitError::QuotaExceeded { remaining: 2 }));

        let receipts = pipeline.submit_at(&alice, &fasta(2), noon()).await.unwrap();
        assert_eq!(receipts.len(), 2);
        assert_eq!(pipeline.store().len().await, 10);
    }

    #[tokio::test]
    async fn test_unverified_identity() {
        let pipeline = pipeline();
        let bob = Identity::new(2, "bob", false);

        let err = pipeline.submit_at(&bob, &fasta(1), noon()).await.unwrap_err();
        assert!(matches!(err, SubmitError::EmailNotVerified));

        // 邮箱检查先于解析
        let err = pipeline.submit_at(&bob, "no markers", noon()).await.unwrap_err();
        assert!(matches!(err, SubmitError::EmailNotVerified));
    }

    #[tokio::test]
    async fn test_no_markers() {
        let pipeline = pipeline();
        let alice = Identity::new(1, "alice", true);

        let err = pipeline
            .submit_at(&alice, "ACDEFGHIKLMNPQRSTVWY", noon())
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::NoSequences));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_parse_error() {
        let pipeline = pipeline();
        let alice = Identity::new(1, "alice", true);

        let err = pipeline
            .submit_bytes(&alice, b">a\nAC\xff\xfeDE")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "parse_error");
        assert!(err.to_string().starts_with("Error parsing FASTA format:"));
    }

    #[tokio::test]
    async fn test_receipts_follow_record_order() {
        let pipeline = pipeline();
        let alice = Identity::new(1, "alice", true);

        let receipts = pipeline
            .submit_at(&alice, ">\nACDE\n>label2\nFGHI", noon())
            .await
            .unwrap();
        let labels: Vec<&str> = receipts.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["seq_1", "label2"]);
        assert!(receipts[0].id < receipts[1].id);
    }
}
