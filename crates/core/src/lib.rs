pub mod domain;
pub mod flows;
pub mod llm;
pub mod news;
pub mod toggle;

pub mod config {
    use anyhow::Context;

    use crate::llm::Provider;

    const DEFAULT_NEWS_BASE_URL: &str = "https://www.marketwatch.com";
    const DEFAULT_NEWS_TIMEOUT_SECS: u64 = 30;

    // Plain desktop browser string; the news site rejects obvious bot agents.
    const DEFAULT_NEWS_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub llm_provider: Provider,
        pub anthropic_api_key: Option<String>,
        pub gemini_api_key: Option<String>,
        pub sentry_dsn: Option<String>,
        pub news_base_url: String,
        pub news_user_agent: String,
        pub news_timeout_secs: u64,
        pub ai_enabled: bool,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let llm_provider = match std::env::var("LLM_PROVIDER") {
                Ok(s) => s.parse::<Provider>()?,
                Err(_) => Provider::Gemini,
            };

            let ai_enabled = match std::env::var("AI_ENABLED") {
                Ok(s) => parse_bool(&s)
                    .with_context(|| format!("AI_ENABLED must be true/false (got {s:?})"))?,
                Err(_) => true,
            };

            let news_timeout_secs = match std::env::var("NEWS_TIMEOUT_SECS") {
                Ok(s) => parse_secs(&s).with_context(|| {
                    format!("NEWS_TIMEOUT_SECS must be a positive whole number (got {s:?})")
                })?,
                Err(_) => DEFAULT_NEWS_TIMEOUT_SECS,
            };

            Ok(Self {
                llm_provider,
                anthropic_api_key: std::env::var("ANTHROPIC_API_KEY").ok(),
                gemini_api_key: std::env::var("GEMINI_API_KEY")
                    .or_else(|_| std::env::var("GOOGLE_API_KEY"))
                    .ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                news_base_url: std::env::var("NEWS_BASE_URL")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_NEWS_BASE_URL.to_string()),
                news_user_agent: std::env::var("NEWS_USER_AGENT")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_NEWS_USER_AGENT.to_string()),
                news_timeout_secs,
                ai_enabled,
            })
        }

        pub fn require_anthropic_api_key(&self) -> anyhow::Result<&str> {
            self.anthropic_api_key
                .as_deref()
                .context("ANTHROPIC_API_KEY is required")
        }

        pub fn require_gemini_api_key(&self) -> anyhow::Result<&str> {
            self.gemini_api_key
                .as_deref()
                .context("GEMINI_API_KEY (or GOOGLE_API_KEY) is required")
        }
    }

    fn parse_bool(s: &str) -> Option<bool> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        }
    }

    fn parse_secs(s: &str) -> Option<u64> {
        s.trim().parse::<u64>().ok().filter(|secs| *secs > 0)
    }

}
