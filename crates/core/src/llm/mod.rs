pub mod anthropic;
pub mod error;
pub mod gemini;
mod http;
pub mod json;

use crate::config::Settings;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// One structured-output round trip: a rendered prompt plus the JSON schema the answer must
/// follow. `flow` names the calling flow for logs and diagnostics.
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    pub flow: &'static str,
    pub prompt: String,
    pub schema: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    Gemini,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Anthropic => f.write_str("anthropic"),
            Provider::Gemini => f.write_str("gemini"),
        }
    }
}

impl FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Provider::Anthropic),
            "gemini" | "google" | "googleai" => Ok(Provider::Gemini),
            other => anyhow::bail!("unknown LLM_PROVIDER {other:?} (expected anthropic or gemini)"),
        }
    }
}

#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    fn provider(&self) -> Provider;

    /// Returns the model's structured output as raw JSON. Callers decode and validate it.
    async fn generate(&self, req: StructuredRequest) -> anyhow::Result<serde_json::Value>;
}

pub fn client_from_settings(settings: &Settings) -> anyhow::Result<Arc<dyn LlmClient>> {
    Ok(match settings.llm_provider {
        Provider::Anthropic => Arc::new(anthropic::AnthropicClient::from_settings(settings)?),
        Provider::Gemini => Arc::new(gemini::GeminiClient::from_settings(settings)?),
    })
}

/// Stand-in used when the backend could not be configured (e.g. missing API key). Every call
/// fails with stage `config` so servers can keep non-AI features running.
#[derive(Debug, Clone)]
pub struct UnconfiguredClient {
    provider: Provider,
    reason: String,
}

impl UnconfiguredClient {
    pub fn new(provider: Provider, reason: impl Into<String>) -> Self {
        Self {
            provider,
            reason: reason.into(),
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for UnconfiguredClient {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn generate(&self, req: StructuredRequest) -> anyhow::Result<serde_json::Value> {
        Err(
            error::LlmDiagnosticsError::new(self.provider, req.flow, "config", self.reason.clone())
                .into(),
        )
    }
}
