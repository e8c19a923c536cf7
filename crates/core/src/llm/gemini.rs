use crate::config::Settings;
use crate::llm::error::LlmDiagnosticsError;
use crate::llm::{http, json};
use crate::llm::{LlmClient, Provider, StructuredRequest};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Ok(Self {
            http: http::client(
                Provider::Gemini,
                http::env_parsed("GEMINI_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS),
            )?,
            api_key: settings.require_gemini_api_key()?.to_string(),
            base_url: http::env_or("GEMINI_BASE_URL", DEFAULT_BASE_URL),
            model: http::env_or("GEMINI_MODEL", DEFAULT_MODEL),
        })
    }

    fn url(&self) -> String {
        let model = self.model.trim_start_matches("models/");
        format!(
            "{}/v1beta/models/{model}:generateContent",
            self.base_url.trim_end_matches('/')
        )
    }

    async fn generate_content(
        &self,
        flow: &'static str,
        req: &GenerateContentRequest,
    ) -> anyhow::Result<(serde_json::Value, GenerateContentResponse)> {
        let mut headers = HeaderMap::new();
        headers.insert("x-goog-api-key", HeaderValue::from_str(&self.api_key)?);

        http::post_json(&self.http, Provider::Gemini, flow, &self.url(), headers, req).await
    }

    fn response_text(res: &GenerateContentResponse) -> String {
        let Some(candidate) = res.candidates.first() else {
            return String::new();
        };
        candidate
            .content
            .as_ref()
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }

    fn structured_output(
        flow: &'static str,
        res: &GenerateContentResponse,
        raw_json: serde_json::Value,
    ) -> anyhow::Result<serde_json::Value> {
        let text = Self::response_text(res);
        if let Some(value) = json::parse_object(&text) {
            return Ok(value);
        }

        let finish_reason = res
            .candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
            .unwrap_or("none");
        let block_reason = res
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
            .unwrap_or("none");

        Err(LlmDiagnosticsError {
            provider: Provider::Gemini,
            flow,
            stage: "missing_output",
            detail: format!(
                "no JSON object in response (finish_reason={finish_reason}, block_reason={block_reason})"
            ),
            status: None,
            raw_output: Some(text),
            raw_response_json: Some(raw_json),
        }
        .into())
    }
}

/// Gemini's `responseSchema` is an OpenAPI subset that spells types in upper case.
fn to_gemini_schema(schema: &serde_json::Value) -> serde_json::Value {
    match schema {
        serde_json::Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                if k == "additionalProperties" {
                    continue;
                }
                let converted = match (k.as_str(), v) {
                    ("type", serde_json::Value::String(t)) => {
                        serde_json::Value::String(t.to_ascii_uppercase())
                    }
                    _ => to_gemini_schema(v),
                };
                out.insert(k.clone(), converted);
            }
            serde_json::Value::Object(out)
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(to_gemini_schema).collect())
        }
        other => other.clone(),
    }
}

#[async_trait::async_trait]
impl LlmClient for GeminiClient {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    async fn generate(&self, req: StructuredRequest) -> anyhow::Result<serde_json::Value> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(req.prompt.clone()),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: to_gemini_schema(&req.schema),
            },
        };

        let (raw_json, res) = self.generate_content(req.flow, &body).await?;
        Self::structured_output(req.flow, &res, raw_json)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}
