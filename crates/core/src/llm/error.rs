use crate::llm::Provider;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone)]
pub struct LlmDiagnosticsError {
    pub provider: Provider,
    pub flow: &'static str,
    pub stage: &'static str,
    pub detail: String,
    pub status: Option<u16>,
    pub raw_output: Option<String>,
    pub raw_response_json: Option<Value>,
}

impl LlmDiagnosticsError {
    pub fn new(
        provider: Provider,
        flow: &'static str,
        stage: &'static str,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            flow,
            stage,
            detail: detail.into(),
            status: None,
            raw_output: None,
            raw_response_json: None,
        }
    }

    /// Quota exhaustion or throttling on the backend side.
    pub fn is_rate_limited(&self) -> bool {
        if self.status == Some(429) {
            return true;
        }
        let raw = self.raw_output.as_deref().unwrap_or_default();
        raw.contains("RESOURCE_EXHAUSTED") || raw.contains("rate_limit_error")
    }
}

impl fmt::Display for LlmDiagnosticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LLM error (provider={}, flow={}, stage={}): {}",
            self.provider, self.flow, self.stage, self.detail
        )
    }
}

impl std::error::Error for LlmDiagnosticsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_rate_limit_from_status_or_body() {
        let mut err =
            LlmDiagnosticsError::new(Provider::Gemini, "aiChatFlow", "http", "status=429");
        assert!(!err.is_rate_limited());

        err.status = Some(429);
        assert!(err.is_rate_limited());

        let mut err =
            LlmDiagnosticsError::new(Provider::Gemini, "aiChatFlow", "http", "status=503");
        err.status = Some(503);
        err.raw_output = Some(r#"{"error":{"status":"RESOURCE_EXHAUSTED"}}"#.to_string());
        assert!(err.is_rate_limited());
    }

    #[test]
    fn display_names_flow_and_stage() {
        let err =
            LlmDiagnosticsError::new(Provider::Anthropic, "getStockInfoFlow", "schema", "bad");
        assert_eq!(
            err.to_string(),
            "LLM error (provider=anthropic, flow=getStockInfoFlow, stage=schema): bad"
        );
    }
}
