//! Chat-completion providers.

use reqwest::Client;
use std::sync::Arc;

pub mod deepseek;
pub mod provider;
pub mod sample;

pub use deepseek::DeepSeekProvider;
pub use provider::{CompletionError, Provider};
pub use sample::{SampleProvider, SAMPLE_REPLY};

use crate::config::DeepSeekConfig;

/// Provider factory: DeepSeek when an API key is configured, sample replies otherwise.
pub fn create_provider(client: Client, config: &DeepSeekConfig) -> Arc<dyn Provider> {
    if config.api_key().is_some() {
        Arc::new(DeepSeekProvider::new(client, config))
    } else {
        Arc::new(SampleProvider)
    }
}
