//! Single round-trip prompt flows: validated input, rendered template, one structured model
//! call, validated output. Nothing here retries, streams, or caches.

pub mod chat;
pub mod market_trends;
pub mod news_generator;
pub mod sentiment;
pub mod stock_info;
pub mod trading_suggestions;

use crate::domain::chat::{AiChatInput, AiChatOutput};
use crate::domain::contract::{Contract, StructuredOutput};
use crate::domain::market::{
    MarketTrendSummary, MarketTrendsInput, StockInfo, StockInfoInput, TradingSuggestions,
    TradingSuggestionsInput,
};
use crate::domain::news::{NewsSentimentInput, SentimentResult};
use crate::llm::error::LlmDiagnosticsError;
use crate::llm::{LlmClient, StructuredRequest};
use crate::toggle::AiToggle;
use std::sync::Arc;

pub trait PromptFlow {
    const NAME: &'static str;

    type Input: Contract + Send;
    type Output: StructuredOutput;

    fn render(input: &Self::Input) -> String;
}

/// Runs one flow against `llm`. Input contract failures surface as `ContractViolation`
/// before any backend call; bad or absent model output surfaces as `LlmDiagnosticsError`.
pub async fn run_flow<F: PromptFlow>(
    llm: &dyn LlmClient,
    input: F::Input,
) -> anyhow::Result<F::Output> {
    let input = input.validated()?;
    let prompt = F::render(&input);

    tracing::debug!(flow = F::NAME, provider = %llm.provider(), "running prompt flow");

    let raw = llm
        .generate(StructuredRequest {
            flow: F::NAME,
            prompt,
            schema: F::Output::json_schema(),
        })
        .await?;

    let schema_error = |detail: String, raw: serde_json::Value| LlmDiagnosticsError {
        provider: llm.provider(),
        flow: F::NAME,
        stage: "schema",
        detail,
        status: None,
        raw_output: Some(raw.to_string()),
        raw_response_json: Some(raw),
    };

    let decoded = match serde_json::from_value::<F::Output>(raw.clone()) {
        Ok(v) => v,
        Err(err) => return Err(schema_error(format!("decode failed: {err}"), raw).into()),
    };

    match decoded.validated() {
        Ok(output) => Ok(output),
        Err(violation) => Err(schema_error(violation.to_string(), raw).into()),
    }
}

/// Flow entry points behind the AI toggle.
#[derive(Clone)]
pub struct FlowRunner {
    llm: Arc<dyn LlmClient>,
    toggle: AiToggle,
}

impl FlowRunner {
    pub fn new(llm: Arc<dyn LlmClient>, toggle: AiToggle) -> Self {
        Self { llm, toggle }
    }

    pub fn toggle(&self) -> &AiToggle {
        &self.toggle
    }

    /// The backend without the toggle gate, for paths that must keep working with AI off.
    pub fn llm(&self) -> &dyn LlmClient {
        self.llm.as_ref()
    }

    pub async fn run<F: PromptFlow>(&self, input: F::Input) -> anyhow::Result<F::Output> {
        self.toggle.ensure_enabled(F::NAME)?;
        run_flow::<F>(self.llm.as_ref(), input).await
    }

    pub async fn ai_chat(&self, input: AiChatInput) -> anyhow::Result<AiChatOutput> {
        self.run::<chat::AiChatFlow>(input).await
    }

    pub async fn get_stock_info(&self, input: StockInfoInput) -> anyhow::Result<StockInfo> {
        self.run::<stock_info::StockInfoFlow>(input).await
    }

    pub async fn get_news_sentiment(
        &self,
        input: NewsSentimentInput,
    ) -> anyhow::Result<SentimentResult> {
        self.run::<sentiment::NewsSentimentFlow>(input).await
    }

    pub async fn generate_trading_suggestions(
        &self,
        input: TradingSuggestionsInput,
    ) -> anyhow::Result<TradingSuggestions> {
        self.run::<trading_suggestions::TradingSuggestionsFlow>(input).await
    }

    pub async fn summarize_market_trends(
        &self,
        input: MarketTrendsInput,
    ) -> anyhow::Result<MarketTrendSummary> {
        self.run::<market_trends::MarketTrendsFlow>(input).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::llm::{LlmClient, Provider, StructuredRequest};
    use std::sync::Mutex;

    /// Replays canned responses in order and records every request it sees.
    pub struct ScriptedLlm {
        responses: Mutex<Vec<anyhow::Result<serde_json::Value>>>,
        pub requests: Mutex<Vec<StructuredRequest>>,
    }

    impl ScriptedLlm {
        pub fn new(responses: Vec<anyhow::Result<serde_json::Value>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn replying(value: serde_json::Value) -> Self {
            Self::new(vec![Ok(value)])
        }

        pub fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub fn last_prompt(&self) -> String {
            self.requests
                .lock()
                .unwrap()
                .last()
                .map(|r| r.prompt.clone())
                .unwrap_or_default()
        }
    }

    #[async_trait::async_trait]
    impl LlmClient for ScriptedLlm {
        fn provider(&self) -> Provider {
            Provider::Gemini
        }

        async fn generate(&self, req: StructuredRequest) -> anyhow::Result<serde_json::Value> {
            self.requests.lock().unwrap().push(req);
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                anyhow::bail!("scripted LLM has no responses left");
            }
            responses.remove(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedLlm;
    use super::*;
    use crate::domain::contract::ContractViolation;
    use crate::domain::market::Suggestion;
    use crate::toggle::AiDisabledError;
    use serde_json::json;

    fn runner(llm: ScriptedLlm, enabled: bool) -> (Arc<ScriptedLlm>, FlowRunner) {
        let llm = Arc::new(llm);
        let runner = FlowRunner::new(llm.clone(), AiToggle::new(enabled));
        (llm, runner)
    }

    #[tokio::test]
    async fn valid_output_passes_through_with_trimmed_text() {
        let (llm, runner) = runner(
            ScriptedLlm::replying(json!({
                "summary": " Solid cloud growth. ",
                "suggestion": "BUY",
                "reasoning": "Margins expanding.",
            })),
            true,
        );

        let info = runner
            .get_stock_info(StockInfoInput {
                stock_symbol: "MSFT".into(),
            })
            .await
            .unwrap();

        assert_eq!(info.suggestion, Suggestion::Buy);
        assert_eq!(info.summary, "Solid cloud growth.");
        let req = llm.requests.lock().unwrap();
        assert_eq!(req[0].flow, "getStockInfoFlow");
        assert_eq!(req[0].schema, StockInfo::json_schema());
    }

    #[tokio::test]
    async fn out_of_enum_output_is_a_schema_error() {
        let (_, runner) = runner(
            ScriptedLlm::replying(json!({"sentiment": "Mixed", "reasoning": "Both ways."})),
            true,
        );

        let err = runner
            .get_news_sentiment(NewsSentimentInput {
                title: "Chipmaker misses".into(),
                summary: "".into(),
            })
            .await
            .unwrap_err();

        let diag = err.downcast_ref::<LlmDiagnosticsError>().unwrap();
        assert_eq!(diag.stage, "schema");
        assert_eq!(diag.flow, "getNewsSentimentFlow");
    }

    #[tokio::test]
    async fn empty_free_text_output_is_a_schema_error() {
        let (_, runner) = runner(ScriptedLlm::replying(json!({"summary": "  "})), true);

        let err = runner
            .summarize_market_trends(MarketTrendsInput {
                news_summary: "Fed holds rates.".into(),
            })
            .await
            .unwrap_err();

        let diag = err.downcast_ref::<LlmDiagnosticsError>().unwrap();
        assert_eq!(diag.stage, "schema");
        assert!(diag.detail.contains("summary"));
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_backend() {
        let (llm, runner) = runner(ScriptedLlm::new(vec![]), true);

        let err = runner
            .get_stock_info(StockInfoInput {
                stock_symbol: " ".into(),
            })
            .await
            .unwrap_err();

        assert!(err.downcast_ref::<ContractViolation>().is_some());
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn disabled_toggle_blocks_every_flow() {
        let (llm, runner) = runner(ScriptedLlm::new(vec![]), false);

        let err = runner
            .generate_trading_suggestions(TradingSuggestionsInput {
                trading_history: "Swing trades in tech".into(),
                risk_tolerance: "High".into(),
                market_conditions: "Volatile".into(),
            })
            .await
            .unwrap_err();

        let disabled = err.downcast_ref::<AiDisabledError>().unwrap();
        assert_eq!(disabled.flow, "generateTradingSuggestionsFlow");
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn backend_errors_propagate_without_retry() {
        let (llm, runner) = runner(
            ScriptedLlm::new(vec![
                Err(anyhow::anyhow!("upstream exploded")),
                Ok(json!({"response": "never used"})),
            ]),
            true,
        );

        let res = runner
            .ai_chat(AiChatInput {
                history: vec![],
                query: "How is AAPL doing?".into(),
                stock_context: "AAPL".into(),
            })
            .await;

        assert!(res.is_err());
        assert_eq!(llm.calls(), 1);
    }
}
