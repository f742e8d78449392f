use serde::{Deserialize, Serialize};
use std::fmt;

/// 用户ID（由身份提供方分配）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 提交者身份
///
/// 提交流程只关心 `id` 和 `email_verified` 两个字段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email_verified: bool,
}

impl Identity {
    pub fn new(id: u64, username: impl Into<String>, email_verified: bool) -> Self {
        Self {
            id: UserId(id),
            username: username.into(),
            email_verified,
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.username, self.id)
    }
}
