//! JSON 文件存储
//!
//! 整个存储状态保存为一个 JSON 文件。每次写操作先写临时文件再 rename 覆盖，
//! 文件替换成功后才更新内存中的状态

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::StoreResult;
use crate::infrastructure::store::{IdentityGuard, IdentityLocks, StoreState, SubmissionStore};
use crate::models::identity::UserId;
use crate::models::submission::{Submission, SubmissionId};

/// 基于 JSON 文件的持久化存储
///
/// 只支持单个写入进程：快照在 `open` 时读入一次，之后每次写入都整体覆盖文件，
/// 用户锁也只在本进程内有效。多个进程共用同一个 `store_path` 会互相覆盖记录
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    state: RwLock<StoreState>,
    locks: IdentityLocks,
}

impl JsonFileStore {
    /// 打开存储文件，不存在时以空状态开始（首次写入时创建）
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        let state = if fs::try_exists(&path).await? {
            let content = fs::read_to_string(&path).await?;
            if content.trim().is_empty() {
                StoreState::default()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            StoreState::default()
        };

        info!(
            "📂 已打开提交存储 {} (共 {} 条记录)",
            path.display(),
            state.submissions.len()
        );

        Ok(Self {
            path,
            state: RwLock::new(state),
            locks: IdentityLocks::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 将状态写入磁盘
    async fn persist(&self, state: &StoreState) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_vec_pretty(state)?;
        let tmp_path = self.path.with_extension("json.tmp");

        fs::write(&tmp_path, json).await?;
        fs::rename(&tmp_path, &self.path).await?;

        debug!(
            "写入存储文件 {} ({} 条记录)",
            self.path.display(),
            state.submissions.len()
        );
        Ok(())
    }
}

impl SubmissionStore for JsonFileStore {
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
        let mut state = self.state.write().await;

        let mut next = state.clone();
        let created = next.append(user, payloads, now)?;
        self.persist(&next).await?;

        *state = next;
        Ok(created)
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
        let mut state = self.state.write().await;

        let mut next = state.clone();
        let scored = next.complete(id, result, at)?;
        self.persist(&next).await?;

        *state = next;
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use chrono::TimeZone;

    async fn scratch_file(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "sequence_submit_json_{}_{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir).await;
        dir.join("store").join("submissions.json")
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let path = scratch_file("reopen").await;
        let now = Utc.with_ymd_and_hms(2025, 3, 29, 12, 0, 0).unwrap();

        {
            let store = JsonFileStore::open(&path).await.unwrap();
            store
                .insert_submissions(UserId(5), &["ACDE".to_string(), "WYWY".to_string()], now)
                .await
                .unwrap();
            store.record_result(SubmissionId(1), 0.9, now).await.unwrap();
        }

        let reopened = JsonFileStore::open(&path).await.unwrap();
        let listed = reopened.list_submissions(UserId(5)).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[1].result, 0.9);
        assert_eq!(reopened.pending_submissions().await.unwrap().len(), 1);

        // ID 在重新打开后继续递增
        let more = reopened
            .insert_submissions(UserId(5), &["KLMN".to_string()], now)
            .await
            .unwrap();
        assert_eq!(more[0].id, SubmissionId(3));
    }

    #[tokio::test]
    async fn test_snapshot_is_read_only_at_open() {
        let path = scratch_file("snapshot").await;
        let now = Utc.with_ymd_and_hms(2025, 3, 29, 12, 0, 0).unwrap();

        let writer = JsonFileStore::open(&path).await.unwrap();
        let stale = JsonFileStore::open(&path).await.unwrap();
        writer
            .insert_submissions(UserId(1), &["ACDE".to_string()], now)
            .await
            .unwrap();

        // 已打开的实例看不到其他实例的写入
        assert!(stale.list_submissions(UserId(1)).await.unwrap().is_empty());
        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(reopened.list_submissions(UserId(1)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_batch_leaves_file_untouched() {
        let path = scratch_file("reject").await;
        let now = Utc.with_ymd_and_hms(2025, 3, 29, 12, 0, 0).unwrap();
        let store = JsonFileStore::open(&path).await.unwrap();

        let err = store
            .insert_submissions(UserId(1), &["ACDE".to_string(), "".to_string()], now)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidSequence { .. }));
        assert!(!fs::try_exists(&path).await.unwrap());
        assert!(store.list_submissions(UserId(1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let path = scratch_file("corrupt").await;
        fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        fs::write(&path, "{ not json").await.unwrap();

        let err = JsonFileStore::open(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
