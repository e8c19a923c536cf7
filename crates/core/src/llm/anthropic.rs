use crate::config::Settings;
use crate::llm::error::LlmDiagnosticsError;
use crate::llm::{http, json};
use crate::llm::{LlmClient, Provider, StructuredRequest};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-3-5-sonnet-latest";
const DEFAULT_MAX_TOKENS: u32 = 2048;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Ok(Self {
            http: http::client(
                Provider::Anthropic,
                http::env_parsed("ANTHROPIC_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS),
            )?,
            api_key: settings.require_anthropic_api_key()?.to_string(),
            base_url: http::env_or("ANTHROPIC_BASE_URL", DEFAULT_BASE_URL),
            model: http::env_or("ANTHROPIC_MODEL", DEFAULT_MODEL),
            max_tokens: http::env_parsed("ANTHROPIC_MAX_TOKENS", DEFAULT_MAX_TOKENS),
        })
    }

    async fn create_message(
        &self,
        flow: &'static str,
        req: &CreateMessageRequest,
    ) -> anyhow::Result<(serde_json::Value, CreateMessageResponse)> {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_str(&self.api_key)?);
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));
        http::post_json(&self.http, Provider::Anthropic, flow, &url, headers, req).await
    }

    fn tool_for(req: &StructuredRequest) -> Tool {
        Tool {
            name: req.flow,
            description: "Emit the final answer as structured JSON",
            input_schema: req.schema.clone(),
        }
    }

    fn system_prompt() -> String {
        [
            "Answer by calling the provided tool exactly once.",
            "The tool input must satisfy its schema. Do not add extra keys.",
            "Never leave a required string empty.",
        ]
        .join("\n")
    }

    fn response_text(res: &CreateMessageResponse) -> String {
        let mut out = String::new();
        for block in &res.content {
            if let ContentBlock::Text { text } = block {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(text);
            }
        }
        out
    }

    fn response_tool_input(
        res: &CreateMessageResponse,
        tool_name: &str,
    ) -> Option<serde_json::Value> {
        res.content.iter().find_map(|block| match block {
            ContentBlock::ToolUse { name, input, .. } if name == tool_name && input.is_object() => {
                Some(input.clone())
            }
            _ => None,
        })
    }

    fn structured_output(
        req: &StructuredRequest,
        res: &CreateMessageResponse,
        raw_json: serde_json::Value,
    ) -> anyhow::Result<serde_json::Value> {
        if let Some(input) = Self::response_tool_input(res, req.flow) {
            return Ok(input);
        }

        // Text fallback.
        let text = Self::response_text(res);
        if let Some(value) = json::parse_object(&text) {
            return Ok(value);
        }

        Err(LlmDiagnosticsError {
            provider: Provider::Anthropic,
            flow: req.flow,
            stage: "missing_output",
            detail: format!(
                "no tool_use or JSON text in response (stop_reason={})",
                res.stop_reason.as_deref().unwrap_or("none")
            ),
            status: None,
            raw_output: Some(text),
            raw_response_json: Some(raw_json),
        }
        .into())
    }
}

#[async_trait::async_trait]
impl LlmClient for AnthropicClient {
    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    async fn generate(&self, req: StructuredRequest) -> anyhow::Result<serde_json::Value> {
        let body = CreateMessageRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            system: Some(Self::system_prompt()),
            messages: vec![Message {
                role: "user",
                content: req.prompt.clone(),
            }],
            tools: Some(vec![Self::tool_for(&req)]),
            tool_choice: Some(ToolChoice::Tool { name: req.flow }),
        };

        let (raw_json, res) = self.create_message(req.flow, &body).await?;
        if matches!(res.stop_reason.as_deref(), Some("max_tokens")) {
            tracing::warn!(
                flow = req.flow,
                max_tokens = self.max_tokens,
                "Anthropic stop_reason=max_tokens; output may be truncated"
            );
        }

        Self::structured_output(&req, &res, raw_json)
    }
}

#[derive(Debug, Clone, Serialize)]
struct CreateMessageRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,

    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
}

#[derive(Debug, Clone, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CreateMessageResponse {
    content: Vec<ContentBlock>,

    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct Tool {
    name: &'static str,
    description: &'static str,
    input_schema: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
enum ToolChoice {
    #[serde(rename = "tool")]
    Tool { name: &'static str },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },

    #[serde(rename = "tool_use")]
    ToolUse {
        #[serde(default)]
        #[allow(dead_code)]
        id: String,
        #[serde(default)]
        name: String,
        #[serde(default)]
        input: serde_json::Value,
    },

    #[serde(other)]
    Unknown,
}
