use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use visiontrade_core::domain::chat::{AiChatInput, AiChatOutput};
use visiontrade_core::domain::contract::ContractViolation;
use visiontrade_core::domain::market::{
    MarketTrendSummary, MarketTrendsInput, StockInfo, StockInfoInput, TradingSuggestions,
    TradingSuggestionsInput,
};
use visiontrade_core::domain::news::{
    GetNewsInput, GetNewsOutput, NewsSentimentInput, SentimentResult,
};
use visiontrade_core::flows::FlowRunner;
use visiontrade_core::llm::error::LlmDiagnosticsError;
use visiontrade_core::news::NewsService;
use visiontrade_core::toggle::{AiDisabledError, AiToggle};

const QUOTA_MESSAGE: &str = "AI nap time, the quota has been exceeded. Please try again later.";

#[derive(Clone)]
pub struct AppState {
    pub flows: FlowRunner,
    pub news: NewsService,
}

impl AppState {
    fn toggle(&self) -> &AiToggle {
        self.flows.toggle()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/ai-toggle", get(get_ai_toggle).post(set_ai_toggle))
        .route("/ai-toggle/toggle", post(flip_ai_toggle))
        .route("/flows/chat", post(ai_chat))
        .route("/flows/stock-info", post(stock_info))
        .route("/flows/news", post(news))
        .route("/flows/news-sentiment", post(news_sentiment))
        .route("/flows/trading-suggestions", post(trading_suggestions))
        .route("/flows/market-trends", post(market_trends))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Serialize, Deserialize)]
struct ToggleBody {
    enabled: bool,
}

async fn get_ai_toggle(State(state): State<AppState>) -> Json<ToggleBody> {
    Json(ToggleBody {
        enabled: state.toggle().is_enabled(),
    })
}

async fn set_ai_toggle(
    State(state): State<AppState>,
    payload: Result<Json<ToggleBody>, JsonRejection>,
) -> Result<Json<ToggleBody>, ApiError> {
    let Json(body) = payload?;
    state.toggle().set(body.enabled);
    Ok(Json(ToggleBody {
        enabled: state.toggle().is_enabled(),
    }))
}

async fn flip_ai_toggle(State(state): State<AppState>) -> Json<ToggleBody> {
    Json(ToggleBody {
        enabled: state.toggle().toggle(),
    })
}

async fn ai_chat(
    State(state): State<AppState>,
    payload: Result<Json<AiChatInput>, JsonRejection>,
) -> Result<Json<AiChatOutput>, ApiError> {
    let Json(input) = payload?;
    Ok(Json(state.flows.ai_chat(input).await?))
}

async fn stock_info(
    State(state): State<AppState>,
    payload: Result<Json<StockInfoInput>, JsonRejection>,
) -> Result<Json<StockInfo>, ApiError> {
    let Json(input) = payload?;
    Ok(Json(state.flows.get_stock_info(input).await?))
}

async fn news(
    State(state): State<AppState>,
    payload: Result<Json<GetNewsInput>, JsonRejection>,
) -> Result<Json<GetNewsOutput>, ApiError> {
    let Json(input) = payload?;
    Ok(Json(state.news.get_news(input).await?))
}

async fn news_sentiment(
    State(state): State<AppState>,
    payload: Result<Json<NewsSentimentInput>, JsonRejection>,
) -> Result<Json<SentimentResult>, ApiError> {
    let Json(input) = payload?;
    Ok(Json(state.flows.get_news_sentiment(input).await?))
}

async fn trading_suggestions(
    State(state): State<AppState>,
    payload: Result<Json<TradingSuggestionsInput>, JsonRejection>,
) -> Result<Json<TradingSuggestions>, ApiError> {
    let Json(input) = payload?;
    Ok(Json(state.flows.generate_trading_suggestions(input).await?))
}

async fn market_trends(
    State(state): State<AppState>,
    payload: Result<Json<MarketTrendsInput>, JsonRejection>,
) -> Result<Json<MarketTrendSummary>, ApiError> {
    let Json(input) = payload?;
    Ok(Json(state.flows.summarize_market_trends(input).await?))
}

#[derive(Debug)]
pub enum ApiError {
    /// 400 - input failed its contract
    BadRequest(String),

    /// 429 - backend quota exhausted
    RateLimited,

    /// 502 - backend failed or returned unusable output
    Upstream(String),

    /// 503 - AI switched off or backend not configured
    Unavailable(String),

    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                QUOTA_MESSAGE.to_string(),
            ),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, "upstream_error", msg),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let body = ErrorBody {
            error: error_type.into(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(violation) = err.downcast_ref::<ContractViolation>() {
            return ApiError::BadRequest(violation.to_string());
        }
        if let Some(disabled) = err.downcast_ref::<AiDisabledError>() {
            return ApiError::Unavailable(disabled.to_string());
        }
        if let Some(diag) = err.downcast_ref::<LlmDiagnosticsError>() {
            if diag.is_rate_limited() {
                tracing::warn!(flow = diag.flow, provider = %diag.provider, "LLM quota exhausted");
                return ApiError::RateLimited;
            }
            if diag.stage == "config" {
                return ApiError::Unavailable(diag.to_string());
            }
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %err, stage = diag.stage, "flow failed");
            return ApiError::Upstream(diag.to_string());
        }

        sentry_anyhow::capture_anyhow(&err);
        let message = format!("{err:#}");
        tracing::error!(error = %message, "request failed");
        ApiError::Internal(message)
    }
}
