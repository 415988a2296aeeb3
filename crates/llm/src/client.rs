//! Generation request/response types and the [`LlmClient`] seam.
//!
//! The answer pipeline consumes text generation only through [`LlmClient`],
//! so any backend (or a scripted fake in tests) can be injected.

use grounded_core::AppResult;
use serde::{Deserialize, Serialize};

/// One completion call.
///
/// Grounded answering always sends deterministic requests, see
/// [`LlmRequest::deterministic`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmRequest {
    /// Rendered user prompt
    pub prompt: String,

    pub model: String,

    /// Generation cap in tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// `Some(0.0)` means greedy decoding
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Instructions sent as the system message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
}

impl LlmRequest {
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            max_tokens: None,
            temperature: None,
            seed: None,
            system: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Disable sampling: zero temperature and a fixed seed.
    ///
    /// Identical requests against the same model then produce identical text.
    pub fn deterministic(mut self) -> Self {
        self.temperature = Some(0.0);
        self.seed = Some(0);
        self
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// Text produced by a completion call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    /// Generated text, untrimmed
    pub content: String,

    /// Model reported by the backend
    pub model: String,

    #[serde(default)]
    pub usage: LlmUsage,
}

/// Token accounting reported by the backend. Zero when not reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LlmUsage {
    #[serde(default)]
    pub prompt_tokens: u32,

    #[serde(default)]
    pub completion_tokens: u32,
}

impl LlmUsage {
    pub fn total(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Text generation backend.
///
/// Implementations must be safe to share across concurrent requests.
/// A failed call is reported as `AppError::Backend` and is never retried
/// by callers in this workspace.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Provider identifier, e.g. "ollama".
    fn provider_name(&self) -> &str;

    /// Run one completion to the end and return the full text.
    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_request() {
        let request = LlmRequest::new("Q", "llama3.2")
            .with_max_tokens(220)
            .deterministic();

        assert_eq!(request.max_tokens, Some(220));
        assert_eq!(request.temperature, Some(0.0));
        assert_eq!(request.seed, Some(0));
    }

    #[test]
    fn test_usage_totals() {
        let usage = LlmUsage {
            prompt_tokens: 120,
            completion_tokens: 30,
        };
        assert_eq!(usage.total(), 150);
    }

    #[test]
    fn test_request_skips_empty_optionals() {
        let json = serde_json::to_value(LlmRequest::new("hi", "m")).unwrap();
        assert!(json.get("system").is_none());
        assert!(json.get("max_tokens").is_none());
    }
}
