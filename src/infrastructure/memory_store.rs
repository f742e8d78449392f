use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use tokio::sync::RwLock;

use crate::error::StoreResult;
use crate::infrastructure::store::{IdentityGuard, IdentityLocks, StoreState, SubmissionStore};
use crate::models::identity::UserId;
use crate::models::submission::{Submission, SubmissionId};

/// 纯内存存储，进程退出即丢失
///
/// 用于测试和不需要持久化的场景
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
    locks: IdentityLocks,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前记录总数
    pub async fn len(&self) -> usize {
        self.state.read().await.submissions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl SubmissionStore for MemoryStore {
    async fn lock_identity(&self, user: UserId) -> IdentityGuard {
        self.locks.acquire(user).await
    }

    async fn count_submissions_on(
        &self,
        user: UserId,
        day: NaiveDate,
        zone: FixedOffset,
    ) -> StoreResult<usize> {
        Ok(self.state.read().await.count_on(user, day, zone))
    }

    async fn insert_submissions(
        &self,
        user: UserId,
        payloads: &[String],
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<Submission>> {
        self.state.write().await.append(user, payloads, now)
    }

    async fn list_submissions(&self, user: UserId) -> StoreResult<Vec<Submission>> {
        Ok(self.state.read().await.list_for(user))
    }

    async fn pending_submissions(&self) -> StoreResult<Vec<Submission>> {
        Ok(self.state.read().await.pending())
    }

    async fn record_result(
        &self,
        id: SubmissionId,
        result: f64,
        at: DateTime<Utc>,
    ) -> StoreResult<Submission> {
        self.state.write().await.complete(id, result, at)
    }
}
