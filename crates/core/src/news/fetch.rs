use crate::config::Settings;
use anyhow::{Context, Result};
use std::time::Duration;

pub use reqwest::Url;

#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait::async_trait]
pub trait NewsFetcher: Send + Sync {
    /// One GET, no retries. Transport failures are errors; HTTP error statuses are not.
    async fn fetch(&self, url: &Url) -> Result<FetchedPage>;
}

#[derive(Debug, Clone)]
pub struct HttpNewsFetcher {
    http: reqwest::Client,
}

impl HttpNewsFetcher {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(settings.news_user_agent.clone())
            .timeout(Duration::from_secs(settings.news_timeout_secs))
            .build()
            .context("failed to build news http client")?;

        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl NewsFetcher for HttpNewsFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage> {
        let res = self
            .http
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("news request failed: {url}"))?;

        let status = res.status().as_u16();
        let body = res
            .text()
            .await
            .context("failed to read news response body")?;

        Ok(FetchedPage { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_2xx_counts_as_success() {
        let page = |status| FetchedPage {
            status,
            body: String::new(),
        };
        assert!(page(200).is_success());
        assert!(page(204).is_success());
        assert!(!page(301).is_success());
        assert!(!page(404).is_success());
        assert!(!page(503).is_success());
    }
}
