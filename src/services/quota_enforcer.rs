//! 每日配额服务 - 业务能力层
//!
//! 只负责"能不能再提交 n 条"的判断，不写入任何数据。
//! 调用方需要在持有用户锁的情况下调用 [`QuotaEnforcer::authorize`]，
//! 并在同一把锁内完成写入

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use tracing::debug;

use crate::error::SubmitError;
use crate::infrastructure::store::SubmissionStore;
use crate::models::identity::Identity;

/// 配额检查通过后的用量信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaUsage {
    /// 今天已提交的条数
    pub used: usize,
    /// 本次申请的条数
    pub requested: usize,
    /// 本次提交后剩余的条数
    pub remaining: usize,
}

/// 每日配额检查
#[derive(Debug, Clone, Copy)]
pub struct QuotaEnforcer {
    daily_quota: usize,
    zone: FixedOffset,
}

impl QuotaEnforcer {
    /// `zone` 决定"今天"的起止（本地零点到零点）
    pub fn new(daily_quota: usize, zone: FixedOffset) -> Self {
        Self { daily_quota, zone }
    }

    pub fn daily_quota(&self) -> usize {
        self.daily_quota
    }

    pub fn zone(&self) -> FixedOffset {
        self.zone
    }

    /// 前置条件：邮箱必须已验证
    pub fn require_verified(identity: &Identity) -> Result<(), SubmitError> {
        if identity.email_verified {
            Ok(())
        } else {
            Err(SubmitError::EmailNotVerified)
        }
    }

    /// `now` 在配额时区下的日期
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.zone).date_naive()
    }

    /// 已用 `used` 条时能否再提交 `requested` 条
    pub fn check(&self, used: usize, requested: usize) -> Result<QuotaUsage, SubmitError> {
        if used + requested > self.daily_quota {
            return Err(SubmitError::QuotaExceeded {
                remaining: self.daily_quota as i64 - used as i64,
            });
        }

        Ok(QuotaUsage {
            used,
            requested,
            remaining: self.daily_quota - used - requested,
        })
    }

    /// 查询用户今天的提交数并检查本批能否提交
    ///
    /// 先检查邮箱验证，未验证时不会查询存储
    pub async fn authorize<S: SubmissionStore>(
        &self,
        store: &S,
        identity: &Identity,
        requested: usize,
        now: DateTime<Utc>,
    ) -> Result<QuotaUsage, SubmitError> {
        Self::require_verified(identity)?;

        let today = self.today(now);
        let used = store
            .count_submissions_on(identity.id, today, self.zone)
            .await?;

        debug!(
            "用户 {} 在 {} 已提交 {} 条，本次申请 {} 条 (配额 {})",
            identity, today, used, requested, self.daily_quota
        );

        self.check(used, requested)
    }
}
