//! 提交请求上下文
//!
//! 封装"我正在处理第几个请求、来自哪个文件、哪个用户"这一信息

use std::fmt::Display;

/// 提交请求上下文（仅用于日志和拒绝记录）
#[derive(Debug, Clone)]
pub struct SubmissionCtx {
    /// 请求序号（从1开始）
    pub request_index: usize,

    /// 请求名称（通常是文件名）
    pub request_name: String,

    /// 提交者用户名
    pub username: String,
}

impl SubmissionCtx {
    pub fn new(request_index: usize, request_name: String, username: String) -> Self {
        Self {
            request_index,
            request_name,
            username,
        }
    }
}

impl Display for SubmissionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[请求 #{} {} 用户 {}]",
            self.request_index, self.request_name, self.username
        )
    }
}
