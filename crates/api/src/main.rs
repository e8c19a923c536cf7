use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use visiontrade_core::flows::FlowRunner;
use visiontrade_core::llm::{LlmClient, UnconfiguredClient};
use visiontrade_core::news::NewsService;
use visiontrade_core::toggle::AiToggle;

mod app;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = visiontrade_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let llm: Arc<dyn LlmClient> = match visiontrade_core::llm::client_from_settings(&settings) {
        Ok(client) => client,
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(
                error = %e,
                provider = %settings.llm_provider,
                "LLM client unavailable; starting API with AI flows disabled"
            );
            Arc::new(UnconfiguredClient::new(settings.llm_provider, format!("{e:#}")))
        }
    };

    let toggle = AiToggle::new(settings.ai_enabled);
    let flows = FlowRunner::new(llm, toggle);
    let news = NewsService::from_settings(&settings, flows.clone())?;

    let app = app::router(app::AppState { flows, news });

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(
        %addr,
        provider = %settings.llm_provider,
        ai_enabled = settings.ai_enabled,
        "api listening"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
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
