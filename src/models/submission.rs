use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::StoreError;
use crate::models::identity::UserId;

/// 提交记录ID（由存储层分配，单调递增）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(pub u64);

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 提交状态
///
/// 只能从 `Pending` 前进到 `Done`，不会回退
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    /// 等待评分
    Pending,
    /// 已评分
    Done,
}

impl SubmissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Done => "done",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 持久化的提交记录，每条对应一个通过校验的序列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub user: UserId,
    pub sequence: String,
    pub status: SubmissionStatus,
    pub submit_date: DateTime<Utc>,
    #[serde(default)]
    pub result: f64,
    #[serde(default)]
    pub result_date: Option<DateTime<Utc>>,
}

impl Submission {
    /// 创建待评分的提交记录
    pub fn pending(
        id: SubmissionId,
        user: UserId,
        sequence: impl Into<String>,
        submit_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user,
            sequence: sequence.into(),
            status: SubmissionStatus::Pending,
            submit_date,
            result: 0.0,
            result_date: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == SubmissionStatus::Pending
    }

    /// 写入评分结果，`Pending → Done`
    pub fn complete(&mut self, result: f64, at: DateTime<Utc>) -> Result<(), StoreError> {
        if !self.is_pending() {
            return Err(StoreError::AlreadyScored(self.id));
        }
        self.status = SubmissionStatus::Done;
        self.result = result;
        self.result_date = Some(at);
        Ok(())
    }
}

/// 提交成功后返回给调用方的回执（与输入记录顺序一致）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    pub id: SubmissionId,
    pub label: String,
    pub status: SubmissionStatus,
}

impl SubmissionReceipt {
    pub fn new(submission: &Submission, label: impl Into<String>) -> Self {
        Self {
            id: submission.id,
            label: label.into(),
            status: submission.status,
        }
    }
}

impl fmt::Display for SubmissionReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} [{}]", self.id, self.label, self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Submission {
        let at = Utc.with_ymd_and_hms(2025, 3, 29, 3, 35, 0).unwrap();
        Submission::pending(SubmissionId(1), UserId(7), "ACDE", at)
    }

    #[test]
    fn test_pending_defaults() {
        let submission = sample();
        assert_eq!(submission.status, SubmissionStatus::Pending);
        assert_eq!(submission.result, 0.0);
        assert!(submission.result_date.is_none());
    }

    #[test]
    fn test_complete_only_once() {
        let mut submission = sample();
        let scored_at = Utc.with_ymd_and_hms(2025, 3, 30, 0, 0, 0).unwrap();

        submission.complete(0.87, scored_at).unwrap();
        assert_eq!(submission.status, SubmissionStatus::Done);
        assert_eq!(submission.result, 0.87);
        assert_eq!(submission.result_date, Some(scored_at));

        let err = submission.complete(0.1, scored_at).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyScored(SubmissionId(1))));
        assert_eq!(submission.result, 0.87);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["user"], 7);
    }
}
