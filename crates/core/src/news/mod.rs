pub mod extract;
pub mod fetch;

use crate::config::Settings;
use crate::domain::contract::Contract;
use crate::domain::news::{GetNewsInput, GetNewsOutput, NewsHeadline};
use crate::flows::news_generator::NewsGeneratorFlow;
use crate::flows::{run_flow, FlowRunner};
use anyhow::Context;
use std::sync::Arc;

use self::extract::{CssHeadlineExtractor, HeadlineExtractor};
use self::fetch::{HttpNewsFetcher, NewsFetcher, Url};

pub const MAX_HEADLINES: usize = 10;

/// Topics with no per-ticker page; these go to the generator instead of the scraper.
pub const GENERAL_CATEGORIES: [&str; 5] = ["market", "tech", "finance", "crypto", "economy"];

pub fn is_general_category(symbol: &str) -> bool {
    let lower = symbol.trim().to_lowercase();
    GENERAL_CATEGORIES.contains(&lower.as_str())
}

#[derive(Clone)]
pub struct NewsService {
    fetcher: Arc<dyn NewsFetcher>,
    extractor: Arc<dyn HeadlineExtractor>,
    flows: FlowRunner,
    base_url: Url,
}

impl NewsService {
    pub fn new(
        fetcher: Arc<dyn NewsFetcher>,
        extractor: Arc<dyn HeadlineExtractor>,
        flows: FlowRunner,
        base_url: &str,
    ) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("invalid news base URL: {base_url}"))?;
        anyhow::ensure!(
            !base_url.cannot_be_a_base(),
            "news base URL cannot carry a path: {base_url}"
        );

        Ok(Self {
            fetcher,
            extractor,
            flows,
            base_url,
        })
    }

    pub fn from_settings(settings: &Settings, flows: FlowRunner) -> anyhow::Result<Self> {
        Self::new(
            Arc::new(HttpNewsFetcher::from_settings(settings)?),
            Arc::new(CssHeadlineExtractor::marketwatch()?),
            flows,
            &settings.news_base_url,
        )
    }

    /// `{base}/investing/stock/{symbol}/news` with the symbol lowercased and path-escaped.
    pub fn news_url(&self, symbol: &str) -> Url {
        let symbol = symbol.trim().to_lowercase();
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["investing", "stock", symbol.as_str(), "news"]);
        }
        url
    }

    pub async fn get_news(&self, input: GetNewsInput) -> anyhow::Result<GetNewsOutput> {
        let input = input.validated()?;

        if is_general_category(&input.stock_symbol) {
            // The default news feed; not gated by the AI toggle.
            tracing::info!(topic = %input.stock_symbol, "generating news for general category");
            let mut output = run_flow::<NewsGeneratorFlow>(self.flows.llm(), input).await?;
            output.headlines.truncate(MAX_HEADLINES);
            return Ok(output);
        }

        let headlines = self.scrape(&input.stock_symbol).await;
        Ok(GetNewsOutput { headlines })
    }

    async fn scrape(&self, symbol: &str) -> Vec<NewsHeadline> {
        let url = self.news_url(symbol);

        let page = match self.fetcher.fetch(&url).await {
            Ok(page) => page,
            Err(err) => {
                tracing::error!(%symbol, %url, error = %err, "news fetch failed");
                return Vec::new();
            }
        };

        if !page.is_success() {
            tracing::warn!(%symbol, %url, status = page.status, "news fetch returned error status");
            return Vec::new();
        }

        let headlines = self.extractor.extract(&page.body, &url);
        if headlines.is_empty() {
            tracing::warn!(%symbol, %url, "no headlines found; the page layout may have changed");
        } else {
            tracing::debug!(%symbol, count = headlines.len(), "scraped headlines");
        }
        headlines
    }
}
