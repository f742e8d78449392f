use crate::models::amino_acid::MAX_SEQUENCE_LENGTH;

/// 单次提交与每日配额的上限
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionLimits {
    /// 单次提交最多的序列条数
    pub max_sequences_per_batch: usize,
    /// 单条序列最大长度
    pub max_sequence_length: usize,
    /// 每个用户每天最多提交的序列条数
    pub daily_quota: usize,
}

impl Default for SubmissionLimits {
    fn default() -> Self {
        Self {
            max_sequences_per_batch: 10,
            max_sequence_length: MAX_SEQUENCE_LENGTH,
            daily_quota: 10,
        }
    }
}
