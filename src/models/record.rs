use std::fmt;

/// FASTA 中的一条记录：标签 + 序列
///
/// 由解析器产出，只在一次校验过程中存在，不会被持久化
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// `>` 之后的标题文本，为空时为 `seq_<n>`
    pub label: String,
    /// 去掉空白并转为大写后的序列
    pub payload: String,
}

impl Record {
    pub fn new(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            payload: payload.into(),
        }
    }

    /// 序列长度（残基数）
    pub fn len(&self) -> usize {
        self.payload.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ">{} ({} aa)", self.label, self.len())
    }
}
