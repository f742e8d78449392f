//! 单条记录校验
//!
//! 规则本身定义在 `models::amino_acid`，这里只负责把问题映射为带位置和标签的错误

use crate::error::SubmitError;
use crate::models::amino_acid::{check_sequence, SequenceViolation};
use crate::models::record::Record;

/// 按顺序校验每条记录，返回第一个失败
pub fn validate_records(records: &[Record], max_length: usize) -> Result<(), SubmitError> {
    records
        .iter()
        .enumerate()
        .try_for_each(|(i, record)| validate_record(i + 1, record, max_length))
}

/// 校验一条记录，`index` 从 1 开始
///
/// 顺序：空 → 长度 → 字母表
pub fn validate_record(index: usize, record: &Record, max_length: usize) -> Result<(), SubmitError> {
    let label = || record.label.clone();

    check_sequence(&record.payload, max_length).map_err(|violation| match violation {
        SequenceViolation::Empty => SubmitError::EmptySequence {
            index,
            label: label(),
        },
        SequenceViolation::TooLong { length, max } => SubmitError::TooLong {
            index,
            label: label(),
            length,
            max,
        },
        SequenceViolation::InvalidCharacter(invalid) => SubmitError::InvalidAlphabet {
            index,
            label: label(),
            invalid,
        },
    })
}
