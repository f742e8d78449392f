//! 基础设施层
//!
//! 持有共享资源（提交存储、用户表），只暴露能力，不处理校验流程

pub mod identity_provider;
pub mod json_store;
pub mod memory_store;
pub mod store;

pub use identity_provider::{IdentityProvider, StaticIdentityProvider};
pub use json_store::JsonFileStore;
pub use memory_store::MemoryStore;
pub use store::{IdentityGuard, IdentityLocks, SubmissionStore};
