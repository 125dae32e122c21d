//! Completion provider trait.

use async_trait::async_trait;
use thiserror::Error;

/// Why a completion could not be produced.
///
/// The `Display` text is user-facing: it is sent back to the chat in place of
/// an answer.
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("未配置DeepSeek API密钥")]
    NotConfigured,

    #[error("AI服务响应超时，请稍后重试")]
    Timeout,

    #[error("DeepSeek API错误: {status}, {body}")]
    Status { status: u16, body: String },

    #[error("AI返回格式异常")]
    Malformed,

    #[error("AI服务异常: {0}")]
    Request(#[from] reqwest::Error),

    #[error("AI服务异常: {0}")]
    Decode(String),
}

/// A chat-completion backend.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider name.
    fn name(&self) -> &str;

    /// Whether the provider has the credentials it needs.
    fn is_configured(&self) -> bool;

    /// Answer a single user utterance. Never fails: errors are rendered as text.
    async fn complete(&self, prompt: &str) -> String;
}
