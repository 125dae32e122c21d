//! Placeholder provider used when no completion API key is configured.

use async_trait::async_trait;

use super::provider::Provider;

pub const SAMPLE_REPLY: &str = "这是一个示例回复。请配置AI API密钥以获得真实回复。";

#[derive(Debug, Default)]
pub struct SampleProvider;

#[async_trait]
impl Provider for SampleProvider {
    fn name(&self) -> &str {
        "sample"
    }

    fn is_configured(&self) -> bool {
        false
    }

    async fn complete(&self, _prompt: &str) -> String {
        SAMPLE_REPLY.to_string()
    }
}
