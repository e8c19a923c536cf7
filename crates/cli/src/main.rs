use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use visiontrade_core::domain::chat::{AiChatInput, ChatMessage};
use visiontrade_core::domain::market::{MarketTrendsInput, StockInfoInput, TradingSuggestionsInput};
use visiontrade_core::domain::news::{GetNewsInput, NewsSentimentInput};
use visiontrade_core::flows::FlowRunner;
use visiontrade_core::llm::error::LlmDiagnosticsError;
use visiontrade_core::llm::{LlmClient, UnconfiguredClient};
use visiontrade_core::news::NewsService;
use visiontrade_core::toggle::AiToggle;

#[derive(Debug, Parser)]
#[command(name = "visiontrade", about = "Run VisionTrade news and AI flows from the terminal")]
struct Args {
    /// Run as if the AI toggle were off. `news` is not gated and still works.
    #[arg(long, global = true)]
    no_ai: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Headlines for a ticker, or generated ones for a general category (market, tech, ...).
    News {
        #[arg(long)]
        symbol: String,
    },
    StockInfo {
        #[arg(long)]
        symbol: String,
    },
    Sentiment {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        summary: String,
    },
    Chat {
        #[arg(long)]
        query: String,
        #[arg(long, default_value = "")]
        stock: String,
        /// JSON file holding prior turns: `[{"role":"user","content":"..."}, ...]`.
        #[arg(long)]
        history: Option<PathBuf>,
    },
    Suggestions {
        #[arg(long)]
        history: String,
        #[arg(long)]
        risk: String,
        #[arg(long)]
        market: String,
    },
    Trends {
        #[arg(long)]
        news_summary: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = visiontrade_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let llm: Arc<dyn LlmClient> = match visiontrade_core::llm::client_from_settings(&settings) {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(error = %e, provider = %settings.llm_provider, "LLM client unavailable");
            Arc::new(UnconfiguredClient::new(settings.llm_provider, format!("{e:#}")))
        }
    };

    let toggle = AiToggle::new(settings.ai_enabled && !args.no_ai);
    let flows = FlowRunner::new(llm, toggle);

    let result = run(args.command, &settings, flows).await;
    match result {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            if let Some(diag) = err.downcast_ref::<LlmDiagnosticsError>() {
                tracing::error!(
                    flow = diag.flow,
                    stage = diag.stage,
                    status = ?diag.status,
                    raw_output = ?diag.raw_output,
                    "flow failed"
                );
            }
            Err(err)
        }
    }
}

async fn run(
    command: Command,
    settings: &visiontrade_core::config::Settings,
    flows: FlowRunner,
) -> anyhow::Result<serde_json::Value> {
    let output = match command {
        Command::News { symbol } => {
            let news = NewsService::from_settings(settings, flows)?;
            serde_json::to_value(news.get_news(GetNewsInput { stock_symbol: symbol }).await?)?
        }
        Command::StockInfo { symbol } => serde_json::to_value(
            flows
                .get_stock_info(StockInfoInput { stock_symbol: symbol })
                .await?,
        )?,
        Command::Sentiment { title, summary } => serde_json::to_value(
            flows
                .get_news_sentiment(NewsSentimentInput { title, summary })
                .await?,
        )?,
        Command::Chat {
            query,
            stock,
            history,
        } => {
            let history = match history {
                Some(path) => read_history(&path)?,
                None => Vec::new(),
            };
            serde_json::to_value(
                flows
                    .ai_chat(AiChatInput {
                        history,
                        query,
                        stock_context: stock,
                    })
                    .await?,
            )?
        }
        Command::Suggestions {
            history,
            risk,
            market,
        } => serde_json::to_value(
            flows
                .generate_trading_suggestions(TradingSuggestionsInput {
                    trading_history: history,
                    risk_tolerance: risk,
                    market_conditions: market,
                })
                .await?,
        )?,
        Command::Trends { news_summary } => serde_json::to_value(
            flows
                .summarize_market_trends(MarketTrendsInput { news_summary })
                .await?,
        )?,
    };
    Ok(output)
}

fn read_history(path: &std::path::Path) -> anyhow::Result<Vec<ChatMessage>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read chat history {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("chat history {} is not a JSON message array", path.display()))
}

fn init_sentry(settings: &visiontrade_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_news_with_global_flag() {
        let args =
            Args::try_parse_from(["visiontrade", "news", "--symbol", "AAPL", "--no-ai"]).unwrap();
        assert!(args.no_ai);
        assert!(matches!(args.command, Command::News { ref symbol } if symbol == "AAPL"));
    }

    #[test]
    fn chat_stock_context_defaults_to_empty() {
        let args = Args::try_parse_from(["visiontrade", "chat", "--query", "hello"]).unwrap();
        match args.command {
            Command::Chat { stock, history, .. } => {
                assert_eq!(stock, "");
                assert!(history.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn reads_history_file() {
        let path = std::env::temp_dir().join(format!(
            "visiontrade-history-{}.json",
            std::process::id()
        ));
        std::fs::write(
            &path,
            r#"[{"role":"user","content":"hi"},{"role":"model","content":"hello"}]"#,
        )
        .unwrap();

        let history = read_history(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(history, vec![ChatMessage::user("hi"), ChatMessage::model("hello")]);
    }
}
