//! Prothom Alo, read from its public collection API.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, instrument};

use super::{apply_detail, NewsSource, SourceId};
use crate::discover::dedupe_and_limit;
use crate::error::FetchError;
use crate::extract::{DetailExtractor, PageRules};
use crate::http::HttpClient;
use crate::models::Article;
use crate::timestamps;
use crate::urls::resolve;

pub const API_URL: &str = "https://www.prothomalo.com/api/v1/collections/latest-all";
pub const SITE_URL: &str = "https://www.prothomalo.com";
pub const IMAGE_BASE_URL: &str = "https://images.assettype.com/";
const DEFAULT_SECTION: &str = "General";
const DEFAULT_LIMIT: usize = 10;

static PAGE_RULES: PageRules = PageRules {
    heading: None,
    published: None,
    paragraphs: "#container p",
    images: None,
};

pub struct ProthomAlo {
    http: HttpClient,
    api_url: String,
    detail: DetailExtractor,
}

impl ProthomAlo {
    pub fn new(http: HttpClient) -> Self {
        Self::with_api(http, API_URL)
    }

    pub fn with_api(http: HttpClient, api_url: impl Into<String>) -> Self {
        Self {
            http,
            api_url: api_url.into(),
            detail: DetailExtractor::new(&PAGE_RULES, SITE_URL),
        }
    }
}

#[async_trait]
impl NewsSource for ProthomAlo {
    fn id(&self) -> SourceId {
        SourceId::ProthomAlo
    }

    #[instrument(level = "info", skip(self))]
    async fn discover(&self, limit: Option<usize>) -> Result<Vec<Article>, FetchError> {
        let url = format!(
            "{}?item-type=story&offset=0&limit={}",
            self.api_url,
            limit.unwrap_or(DEFAULT_LIMIT)
        );
        let payload: Value = self.http.get_json(&url).await?;
        let articles = dedupe_and_limit(articles_from_payload(&payload), limit);
        info!(count = articles.len(), "Indexed Prothom Alo stories");
        Ok(articles)
    }

    async fn enrich(&self, article: &mut Article) {
        let detail = self.detail.fetch(&self.http, &article.url).await;
        debug!(url = %article.url, bytes = detail.body_text.len(), "Fetched Prothom Alo body");
        apply_detail(article, detail);
    }
}

/// Map `items[].story` objects to articles; anything else is skipped.
pub fn articles_from_payload(payload: &Value) -> Vec<Article> {
    let items = match payload.get("items").and_then(Value::as_array) {
        Some(items) => items,
        None => return Vec::new(),
    };

    items
        .iter()
        .filter_map(|item| item.get("story").filter(|s| s.is_object()))
        .map(story_to_article)
        .collect()
}

fn story_to_article(story: &Value) -> Article {
    let text = |key: &str| {
        story
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or("")
            .to_string()
    };

    let mut article = Article::new(
        SourceId::ProthomAlo,
        text("headline"),
        resolve(&text("url"), SITE_URL),
    );

    article.summary = story
        .get("summary")
        .and_then(Value::as_str)
        .map(|s| s.to_string());

    let section = story
        .get("sections")
        .and_then(Value::as_array)
        .and_then(|sections| sections.first())
        .and_then(|s| s.get("name"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SECTION);
    article.category = Some(section.to_string());

    let hero_key = text("hero-image-s3-key");
    if !hero_key.is_empty() {
        article.image_url = format!("{}{}", IMAGE_BASE_URL, hero_key);
    }

    article.published_at = story
        .get("published-at")
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
        .map(timestamps::from_epoch_millis)
        .unwrap_or_default();

    article
}
