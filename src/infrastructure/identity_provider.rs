use std::collections::HashMap;
use std::path::Path;

use crate::error::AppResult;
use crate::models::identity::{Identity, UserId};
use crate::models::loaders::load_users;

/// 身份提供方
///
/// 注册、登录、邮箱验证都由外部系统完成，这里只负责按用户名/ID 查找身份
pub trait IdentityProvider: Send + Sync {
    fn find_by_username(&self, username: &str) -> Option<Identity>;

    fn find_by_id(&self, id: UserId) -> Option<Identity>;
}

/// 固定用户表（从 `users.toml` 加载）
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityProvider {
    users: HashMap<String, Identity>,
}

impl StaticIdentityProvider {
    /// 用户名重复时以后出现的为准
    pub fn new(users: impl IntoIterator<Item = Identity>) -> Self {
        Self {
            users: users
                .into_iter()
                .map(|identity| (identity.username.clone(), identity))
                .collect(),
        }
    }

    pub async fn from_toml_file(path: &Path) -> AppResult<Self> {
        let users = load_users(path).await?;
        tracing::info!("👤 已加载 {} 个用户", users.len());
        Ok(Self::new(users))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl IdentityProvider for StaticIdentityProvider {
    fn find_by_username(&self, username: &str) -> Option<Identity> {
        self.users.get(username).cloned()
    }

    fn find_by_id(&self, id: UserId) -> Option<Identity> {
        self.users.values().find(|identity| identity.id == id).cloned()
    }
}
