//! 提交存储 - 基础设施层
//!
//! 定义提交记录的存储能力（`SubmissionStore`），以及各实现共享的状态与按用户加锁的机制

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::error::{StoreError, StoreResult};
use crate::models::amino_acid::{check_sequence, SequenceViolation, MAX_SEQUENCE_LENGTH};
use crate::models::identity::UserId;
use crate::models::submission::{Submission, SubmissionId};

/// 提交记录存储
///
/// 职责：
/// - 作为提交记录的唯一可信来源
/// - 提供按用户的互斥锁，使"统计当日数量 → 批量写入"对同一用户串行执行
/// - 批量写入要么全部成功，要么什么都不写
pub trait SubmissionStore: Send + Sync {
    /// 获取某个用户的独占锁，持有期间同一用户的其他提交会等待
    fn lock_identity(&self, user: UserId) -> impl Future<Output = IdentityGuard> + Send;

    /// 统计用户在 `zone` 时区下 `day` 这一天提交的记录数
    fn count_submissions_on(
        &self,
        user: UserId,
        day: NaiveDate,
        zone: FixedOffset,
    ) -> impl Future<Output = StoreResult<usize>> + Send;

    /// 为每条序列创建一条 `pending` 提交记录，按输入顺序返回
    fn insert_submissions(
        &self,
        user: UserId,
        payloads: &[String],
        now: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<Vec<Submission>>> + Send;

    /// 用户的全部提交记录，按提交时间倒序
    fn list_submissions(&self, user: UserId)
        -> impl Future<Output = StoreResult<Vec<Submission>>> + Send;

    /// 所有待评分的记录，按提交时间正序（供评分服务拉取）
    fn pending_submissions(&self) -> impl Future<Output = StoreResult<Vec<Submission>>> + Send;

    /// 评分服务写回结果，`pending → done`
    fn record_result(
        &self,
        id: SubmissionId,
        result: f64,
        at: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<Submission>> + Send;
}

/// 用户独占锁的持有凭证，drop 时释放
#[derive(Debug)]
pub struct IdentityGuard {
    user: UserId,
    _guard: OwnedMutexGuard<()>,
}

impl IdentityGuard {
    pub fn user(&self) -> UserId {
        self.user
    }
}

/// 按用户划分的锁表
///
/// 不同用户之间互不阻塞。无人持有也无人等待的条目在下次获取时清理，
/// 锁表大小只与正在提交的用户数有关
#[derive(Debug, Default)]
pub struct IdentityLocks {
    locks: Mutex<HashMap<UserId, Arc<AsyncMutex<()>>>>,
}

impl IdentityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 等待并获取用户的锁
    pub async fn acquire(&self, user: UserId) -> IdentityGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            // 只剩表内一个引用的锁已空闲
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(user).or_default().clone()
        };

        IdentityGuard {
            user,
            _guard: lock.lock_owned().await,
        }
    }

    /// 锁表中的条目数
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 存储实现共享的数据
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct StoreState {
    pub last_id: u64,
    pub submissions: Vec<Submission>,
}

impl StoreState {
    pub fn count_on(&self, user: UserId, day: NaiveDate, zone: FixedOffset) -> usize {
        self.submissions
            .iter()
            .filter(|s| s.user == user && submitted_on(s, day, zone))
            .count()
    }

    /// 在当前状态上追加一批提交记录
    ///
    /// 先对整批序列做防御性校验，任何一条不合法都不会改动状态
    pub fn append(
        &mut self,
        user: UserId,
        payloads: &[String],
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<Submission>> {
        for payload in payloads {
            reassert_sequence(payload)?;
        }

        let created: Vec<Submission> = payloads
            .iter()
            .enumerate()
            .map(|(offset, payload)| {
                let id = SubmissionId(self.last_id + offset as u64 + 1);
                Submission::pending(id, user, payload.clone(), now)
            })
            .collect();

        self.last_id += created.len() as u64;
        self.submissions.extend(created.iter().cloned());

        Ok(created)
    }

    pub fn list_for(&self, user: UserId) -> Vec<Submission> {
        let mut listed: Vec<Submission> = self
            .submissions
            .iter()
            .filter(|s| s.user == user)
            .cloned()
            .collect();
        sort_newest_first(&mut listed);
        listed
    }

    pub fn pending(&self) -> Vec<Submission> {
        let mut pending: Vec<Submission> = self
            .submissions
            .iter()
            .filter(|s| s.is_pending())
            .cloned()
            .collect();
        pending.sort_by(|a, b| a.submit_date.cmp(&b.submit_date).then(a.id.cmp(&b.id)));
        pending
    }

    pub fn complete(
        &mut self,
        id: SubmissionId,
        result: f64,
        at: DateTime<Utc>,
    ) -> StoreResult<Submission> {
        let submission = self
            .submissions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(StoreError::NotFound(id))?;
        submission.complete(result, at)?;
        Ok(submission.clone())
    }
}

/// 提交时间换算到 `zone` 后是否落在 `day` 当天
pub fn submitted_on(submission: &Submission, day: NaiveDate, zone: FixedOffset) -> bool {
    submission.submit_date.with_timezone(&zone).date_naive() == day
}

/// 默认排序：提交时间倒序，同一时间按 ID 倒序
pub fn sort_newest_first(submissions: &mut [Submission]) {
    submissions.sort_by(|a, b| b.submit_date.cmp(&a.submit_date).then(b.id.cmp(&a.id)));
}

fn reassert_sequence(sequence: &str) -> StoreResult<()> {
    check_sequence(sequence, MAX_SEQUENCE_LENGTH).map_err(|violation| {
        let reason = match violation {
            SequenceViolation::Empty => "empty sequence".to_string(),
            SequenceViolation::TooLong { length, max } => {
                format!("length {length} exceeds {max}")
            }
            SequenceViolation::InvalidCharacter(c) => format!("invalid character {c:?}"),
        };
        StoreError::InvalidSequence {
            sequence: sequence.to_string(),
            reason,
        }
    })
}
