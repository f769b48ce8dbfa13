//! Backend selection for the composition root.

use arbiter_domain::traits::ReasoningBackend;
use arbiter_llm::{FailingBackend, LlmError, OpenRouterBackend};
use async_trait::async_trait;

/// The backend wired at startup: network-backed when an API key is
/// available, always-fail otherwise (which routes every request onto the
/// deterministic fallback ranking).
pub enum CliBackend {
    /// OpenRouter chat-completions backend
    OpenRouter(OpenRouterBackend),
    /// Always-fail stub (offline mode / no API key)
    Offline(FailingBackend),
}

#[async_trait]
impl ReasoningBackend for CliBackend {
    type Error = LlmError;

    async fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        match self {
            CliBackend::OpenRouter(backend) => backend.generate(prompt).await,
            CliBackend::Offline(backend) => backend.generate(prompt).await,
        }
    }

    fn model_name(&self) -> &str {
        match self {
            CliBackend::OpenRouter(backend) => backend.model_name(),
            CliBackend::Offline(backend) => backend.model_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_backend_fails() {
        let backend = CliBackend::Offline(FailingBackend::new());
        assert!(backend.generate("prompt").await.is_err());
        assert_eq!(backend.model_name(), "none");
    }
}
