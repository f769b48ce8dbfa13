//! Arbiter Reasoning Backend Layer
//!
//! Pluggable implementations of the `ReasoningBackend` trait from
//! `arbiter-domain`.
//!
//! # Backends
//!
//! - `OpenRouterBackend`: network-backed chat-completions client
//! - `MockBackend`: deterministic mock for testing
//! - `FailingBackend`: always fails, so the engine's deterministic fallback
//!   path can be exercised in isolation
//!
//! # Examples
//!
//! ```
//! use arbiter_llm::MockBackend;
//! use arbiter_domain::traits::ReasoningBackend;
//!
//! # tokio_test::block_on(async {
//! let backend = MockBackend::new("{\"rankedEntities\": []}");
//! let response = backend.generate("rank these claims").await.unwrap();
//! assert_eq!(response, "{\"rankedEntities\": []}");
//! # });
//! ```

#![warn(missing_docs)]

pub mod openrouter;

use arbiter_domain::traits::ReasoningBackend;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use openrouter::OpenRouterBackend;

/// Errors that can occur during backend operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from the backend
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Backend configured to always fail
    #[error("Reasoning backend unavailable")]
    Unavailable,

    /// Generic error
    #[error("Backend error: {0}")]
    Other(String),
}

/// Deterministic mock backend for testing.
///
/// Returns pre-configured responses without any network call and counts
/// invocations so tests can assert interaction patterns.
#[derive(Debug, Clone)]
pub struct MockBackend {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, String>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockBackend {
    /// Create a mock with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(prompt.into(), response.into());
    }

    /// Configure a specific prompt to error
    pub fn add_error(&mut self, prompt: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(prompt.into(), "ERROR".to_string());
    }

    /// Number of times `generate` was called
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl ReasoningBackend for MockBackend {
    type Error = LlmError;

    async fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        *self.call_count.lock().unwrap() += 1;

        let responses = self.responses.lock().unwrap();
        if let Some(response) = responses.get(prompt) {
            if response == "ERROR" {
                return Err(LlmError::Other("Mock error".to_string()));
            }
            return Ok(response.clone());
        }

        Ok(self.default_response.clone())
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

/// A backend that fails every call.
///
/// Wiring this in forces the engine onto its deterministic fallback path,
/// which keeps that path independently testable and gives the CLI an
/// offline mode.
#[derive(Debug, Clone, Default)]
pub struct FailingBackend;

impl FailingBackend {
    /// Create a new always-fail backend
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ReasoningBackend for FailingBackend {
    type Error = LlmError;

    async fn generate(&self, _prompt: &str) -> Result<String, Self::Error> {
        Err(LlmError::Unavailable)
    }

    fn model_name(&self) -> &str {
        "none"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_backend_default() {
        let backend = MockBackend::new("Test response");
        assert_eq!(backend.generate("any prompt").await.unwrap(), "Test response");
    }

    #[tokio::test]
    async fn test_mock_backend_specific_responses() {
        let mut backend = MockBackend::default();
        backend.add_response("hello", "world");

        assert_eq!(backend.generate("hello").await.unwrap(), "world");
        assert_eq!(
            backend.generate("unknown").await.unwrap(),
            "Default mock response"
        );
    }

    #[tokio::test]
    async fn test_mock_backend_call_count() {
        let backend = MockBackend::new("test");
        assert_eq!(backend.call_count(), 0);

        backend.generate("prompt1").await.unwrap();
        backend.generate("prompt2").await.unwrap();
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_backend_error() {
        let mut backend = MockBackend::default();
        backend.add_error("bad prompt");

        let result = backend.generate("bad prompt").await;
        assert!(matches!(result.unwrap_err(), LlmError::Other(_)));
    }

    #[tokio::test]
    async fn test_mock_backend_clone_shares_count() {
        let backend1 = MockBackend::new("test");
        let backend2 = backend1.clone();

        backend1.generate("test").await.unwrap();
        assert_eq!(backend2.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failing_backend_always_errors() {
        let backend = FailingBackend::new();
        for _ in 0..3 {
            let result = backend.generate("anything").await;
            assert!(matches!(result.unwrap_err(), LlmError::Unavailable));
        }
        assert_eq!(backend.model_name(), "none");
    }
}
