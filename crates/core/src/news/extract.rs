use crate::domain::news::NewsHeadline;
use crate::news::fetch::Url;
use crate::news::MAX_HEADLINES;
use anyhow::Result;
use scraper::{ElementRef, Html, Selector};

/// Best-effort structured extraction from a news listing page.
pub trait HeadlineExtractor: Send + Sync {
    fn extract(&self, html: &str, page_url: &Url) -> Vec<NewsHeadline>;
}

/// CSS selectors for one site layout. These track the site's markup and will need updating
/// whenever it changes.
#[derive(Debug, Clone)]
pub struct SelectorSet {
    pub article: &'static str,
    pub title_link: &'static str,
    pub summary: &'static str,
    pub source: &'static str,
    pub timestamp: &'static str,
    pub default_source: &'static str,
}

impl SelectorSet {
    pub const MARKETWATCH: SelectorSet = SelectorSet {
        article: ".collection__elements .element--article",
        title_link: "h3.article__headline a.link",
        summary: "p.article__summary",
        source: ".article__provider",
        timestamp: ".article__timestamp",
        default_source: "MarketWatch",
    };
}

#[derive(Debug)]
pub struct CssHeadlineExtractor {
    article: Selector,
    title_link: Selector,
    summary: Selector,
    source: Selector,
    timestamp: Selector,
    default_source: &'static str,
}

impl CssHeadlineExtractor {
    pub fn new(set: &SelectorSet) -> Result<Self> {
        Ok(Self {
            article: parse_selector(set.article)?,
            title_link: parse_selector(set.title_link)?,
            summary: parse_selector(set.summary)?,
            source: parse_selector(set.source)?,
            timestamp: parse_selector(set.timestamp)?,
            default_source: set.default_source,
        })
    }

    pub fn marketwatch() -> Result<Self> {
        Self::new(&SelectorSet::MARKETWATCH)
    }

    fn headline(&self, article: ElementRef<'_>, page_url: &Url) -> Option<NewsHeadline> {
        let link = article.select(&self.title_link).next()?;
        let title = element_text(link);
        if title.is_empty() {
            return None;
        }

        let href = link.value().attr("href")?.trim();
        if href.is_empty() {
            return None;
        }
        let url = page_url.join(href).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }

        let source = self.first_text(article, &self.source);
        Some(NewsHeadline {
            title,
            url: url.to_string(),
            source: if source.is_empty() {
                self.default_source.to_string()
            } else {
                source
            },
            summary: self.first_text(article, &self.summary),
            timestamp: self.first_text(article, &self.timestamp),
        })
    }

    fn first_text(&self, article: ElementRef<'_>, selector: &Selector) -> String {
        article
            .select(selector)
            .next()
            .map(element_text)
            .unwrap_or_default()
    }
}

impl HeadlineExtractor for CssHeadlineExtractor {
    fn extract(&self, html: &str, page_url: &Url) -> Vec<NewsHeadline> {
        let document = Html::parse_document(html);

        // The cap applies to containers, not to surviving headlines.
        document
            .select(&self.article)
            .take(MAX_HEADLINES)
            .filter_map(|article| self.headline(article, page_url))
            .collect()
    }
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow::anyhow!("invalid CSS selector {css:?}: {e:?}"))
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}


#[cfg(test)]
mod tests {
    use super::fixtures::{article, page};
    use super::*;

    fn page_url() -> Url {
        Url::parse("https://www.marketwatch.com/investing/stock/aapl/news").unwrap()
    }

    fn extract(html: &str) -> Vec<NewsHeadline> {
        CssHeadlineExtractor::marketwatch()
            .unwrap()
            .extract(html, &page_url())
    }

    #[test]
    fn extracts_all_five_fields() {
        let out = extract(&page(&[article(1)]));
        assert_eq!(
            out,
            vec![NewsHeadline {
                title: "Headline 1".into(),
                url: "https://www.marketwatch.com/story/item-1".into(),
                source: "Dow Jones".into(),
                summary: "Summary 1".into(),
                timestamp: "1h ago".into(),
            }]
        );
    }

    #[test]
    fn caps_at_ten_in_document_order() {
        let articles: Vec<_> = (1..=15).map(article).collect();
        let out = extract(&page(&articles));
        assert_eq!(out.len(), 10);
        let titles: Vec<_> = out.iter().map(|h| h.title.as_str()).collect();
        let expected: Vec<_> = (1..=10).map(|i| format!("Headline {i}")).collect();
        assert_eq!(titles, expected);
    }

    #[test]
    fn skips_container_without_title_but_keeps_sibling() {
        let untitled = r#"<div class="element--article">
            <h3 class="article__headline"><span>no link here</span></h3>
            <p class="article__summary">Orphan summary</p>
        </div>"#
            .to_string();
        let out = extract(&page(&[untitled, article(2)]));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "Headline 2");
    }

    #[test]
    fn skips_links_with_blank_text_or_missing_href() {
        let blank_title = r#"<div class="element--article">
            <h3 class="article__headline"><a class="link" href="/story/x">   </a></h3>
        </div>"#
            .to_string();
        let no_href = r#"<div class="element--article">
            <h3 class="article__headline"><a class="link">Real title</a></h3>
        </div>"#
            .to_string();
        assert!(extract(&page(&[blank_title, no_href])).is_empty());
    }

    #[test]
    fn resolves_relative_links_and_defaults_source() {
        let relative = r#"<div class="element--article">
            <h3 class="article__headline">
              <a class="link" href="/story/relative-slug">  Split
                 across   lines </a>
            </h3>
        </div>"#
            .to_string();

        let out = extract(&page(&[relative]));
        assert_eq!(out[0].url, "https://www.marketwatch.com/story/relative-slug");
        assert_eq!(out[0].title, "Split across lines");
        assert_eq!(out[0].source, "MarketWatch");
        assert_eq!(out[0].summary, "");
        assert_eq!(out[0].timestamp, "");
    }

    #[test]
    fn rejects_non_http_links() {
        let js = r#"<div class="element--article">
            <h3 class="article__headline"><a class="link" href="javascript:void(0)">Click</a></h3>
        </div>"#
            .to_string();
        assert!(extract(&page(&[js])).is_empty());
    }

    #[test]
    fn malformed_html_without_containers_yields_nothing() {
        assert!(extract("<html><body><div class=\"article\"><p>unclosed").is_empty());
        assert!(extract("").is_empty());
    }

    #[test]
    fn articles_outside_collection_are_ignored() {
        let html = format!("<html><body>{}</body></html>", article(1));
        assert!(extract(&html).is_empty());
    }
}
