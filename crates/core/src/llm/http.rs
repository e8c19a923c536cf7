use crate::llm::error::LlmDiagnosticsError;
use crate::llm::Provider;
use anyhow::Context;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::str::FromStr;
use std::time::Duration;

/// `name` from the environment, or `default` when unset.
pub(crate) fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// `name` parsed from the environment. Unset or unparseable falls back to `default`.
pub(crate) fn env_parsed<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.trim().parse::<T>().ok())
        .unwrap_or(default)
}

pub(crate) fn client(provider: Provider, timeout_secs: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .with_context(|| format!("failed to build {provider} http client"))
}

/// POSTs `body` and decodes the reply as `R`, keeping the raw JSON for diagnostics.
/// Non-2xx replies become `LlmDiagnosticsError` with stage `http`.
pub(crate) async fn post_json<B, R>(
    http: &reqwest::Client,
    provider: Provider,
    flow: &'static str,
    url: &str,
    headers: HeaderMap,
    body: &B,
) -> anyhow::Result<(serde_json::Value, R)>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let res = http
        .post(url)
        .headers(headers)
        .json(body)
        .send()
        .await
        .with_context(|| format!("{provider} request failed"))?;

    let status = res.status();
    let text = res
        .text()
        .await
        .with_context(|| format!("failed to read {provider} response body"))?;

    if !status.is_success() {
        return Err(http_error(provider, flow, status.as_u16(), text).into());
    }

    let raw_json = serde_json::from_str::<serde_json::Value>(&text)
        .with_context(|| format!("failed to parse {provider} response JSON: {text}"))?;
    let parsed = serde_json::from_value::<R>(raw_json.clone())
        .with_context(|| format!("unexpected {provider} response shape"))?;
    Ok((raw_json, parsed))
}

fn http_error(
    provider: Provider,
    flow: &'static str,
    status: u16,
    text: String,
) -> LlmDiagnosticsError {
    LlmDiagnosticsError {
        provider,
        flow,
        stage: "http",
        detail: format!("status={status}"),
        status: Some(status),
        raw_response_json: serde_json::from_str(&text).ok(),
        raw_output: Some(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_keeps_status_and_parsed_body() {
        let err = http_error(
            Provider::Gemini,
            "getStockInfoFlow",
            429,
            r#"{"error":{"status":"RESOURCE_EXHAUSTED"}}"#.to_string(),
        );
        assert_eq!(err.stage, "http");
        assert_eq!(err.status, Some(429));
        assert!(err.raw_response_json.is_some());
        assert!(err.is_rate_limited());
    }

    #[test]
    fn http_error_tolerates_non_json_body() {
        let err = http_error(Provider::Anthropic, "aiChatFlow", 502, "Bad Gateway".into());
        assert_eq!(err.raw_output.as_deref(), Some("Bad Gateway"));
        assert!(err.raw_response_json.is_none());
    }

    #[test]
    fn env_parsed_falls_back_on_garbage() {
        assert_eq!(env_parsed("VISIONTRADE_TEST_UNSET_VAR", 7u64), 7);
    }
}
