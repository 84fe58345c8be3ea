//! The Daily Star, scraped from its "Today's News" page.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::Selector;
use tracing::{debug, info, instrument};

use super::{apply_detail, NewsSource, SourceId};
use crate::discover::{dedupe_and_limit, headings_from_html};
use crate::error::FetchError;
use crate::extract::{DetailExtractor, PageRules};
use crate::http::HttpClient;
use crate::image::DAILY_STAR_RULES;
use crate::models::Article;

pub const BASE_URL: &str = "https://www.thedailystar.net";

static PAGE_RULES: PageRules = PageRules {
    heading: Some(".article-title"),
    published: Some(".color-iron"),
    paragraphs: ".clearfix p",
    images: Some(&DAILY_STAR_RULES),
};

static LINK_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse(".title a").unwrap());

pub struct DailyStar {
    http: HttpClient,
    base_url: String,
    detail: DetailExtractor,
}

impl DailyStar {
    pub fn new(http: HttpClient) -> Self {
        Self::with_base(http, BASE_URL)
    }

    pub fn with_base(http: HttpClient, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            detail: DetailExtractor::new(&PAGE_RULES, base_url.clone()),
            base_url,
        }
    }

    fn listing_url(&self) -> String {
        format!("{}/todays-news", self.base_url)
    }
}

#[async_trait]
impl NewsSource for DailyStar {
    fn id(&self) -> SourceId {
        SourceId::DailyStar
    }

    #[instrument(level = "info", skip(self))]
    async fn discover(&self, limit: Option<usize>) -> Result<Vec<Article>, FetchError> {
        let listing_url = self.listing_url();
        let html = self.http.get_html(&listing_url).await?;
        let headings = dedupe_and_limit(
            headings_from_html(&html, &LINK_SEL, &self.base_url),
            limit,
        );

        info!(count = headings.len(), source = %listing_url, "Indexed Daily Star headings");
        Ok(headings
            .into_iter()
            .map(|h| Article::new(SourceId::DailyStar, h.title, h.url))
            .collect())
    }

    async fn enrich(&self, article: &mut Article) {
        let detail = self.detail.fetch(&self.http, &article.url).await;
        debug!(url = %article.url, image = %detail.image_url, "Parsed Daily Star article");
        apply_detail(article, detail);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn http() -> HttpClient {
        HttpClient::new(&Config::default()).unwrap()
    }

    #[tokio::test]
    async fn test_discover_dedupes_and_limits() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/todays-news")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(
                r#"<html><body>
                    <h3 class="title"><a href="/news/bangladesh/one">One</a></h3>
                    <h3 class="title"><a href="/news/bangladesh/two">Two</a></h3>
                    <h3 class="title"><a href="/news/bangladesh/one">One (again)</a></h3>
                    <h3 class="title"><a href="/news/bangladesh/three"> </a></h3>
                    <h3 class="title"><a href="/news/world/four">Four</a></h3>
                </body></html>"#,
            )
            .create_async()
            .await;

        let source = DailyStar::with_base(http(), server.url());
        let all = source.discover(None).await.unwrap();
        let urls: Vec<String> = all.iter().map(|a| a.url.clone()).collect();
        assert_eq!(
            urls,
            vec![
                format!("{}/news/bangladesh/one", server.url()),
                format!("{}/news/bangladesh/two", server.url()),
                format!("{}/news/world/four", server.url()),
            ]
        );

        let limited = source.discover(Some(2)).await.unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[1].title, "Two");
    }

    #[tokio::test]
    async fn test_discover_failure_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/todays-news")
            .with_status(503)
            .create_async()
            .await;

        let source = DailyStar::with_base(http(), server.url());
        assert!(matches!(
            source.discover(Some(5)).await,
            Err(FetchError::Upstream(503))
        ));
    }

    #[tokio::test]
    async fn test_enrich_fills_page_fields() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/news/one")
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body(
                r#"<html><body>
                    <h1 class="article-title">Budget passed</h1>
                    <div class="color-iron">Mon Oct 20, 2025 09:00 PM</div>
                    <picture><source srcset="https://tds-images-bn.thedailystar.net/logo.png 1x"></picture>
                    <picture><source data-srcset="https://tds-images.thedailystar.net/styles/big_202/budget.jpg 1x"></picture>
                    <div class="clearfix"><p>Parliament passed the budget.</p></div>
                </body></html>"#,
            )
            .create_async()
            .await;

        let source = DailyStar::with_base(http(), server.url());
        let mut article = Article::new(
            SourceId::DailyStar,
            "Budget passed",
            format!("{}/news/one", server.url()),
        );
        source.enrich(&mut article).await;

        assert_eq!(article.heading, "Budget passed");
        assert_eq!(article.published_at, "2025-10-20T15:00:00Z");
        assert_eq!(
            article.image_url,
            "https://tds-images.thedailystar.net/styles/big_202/budget.jpg"
        );
        assert_eq!(article.body_text, "Parliament passed the budget.");
    }
}
