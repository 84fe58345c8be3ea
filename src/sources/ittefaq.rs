//! Ittefaq, read from the theme engine's AJAX widget endpoint. The JSON
//! response wraps an HTML fragment that still has to be scraped.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::{debug, info, instrument};

use super::{apply_detail, NewsSource, SourceId};
use crate::discover::dedupe_and_limit;
use crate::error::FetchError;
use crate::extract::{collect_text, normalize_text, DetailExtractor, PageRules};
use crate::http::HttpClient;
use crate::models::Article;
use crate::timestamps;
use crate::urls::resolve;

pub const API_URL: &str = "https://www.ittefaq.com.bd/api/theme_engine/get_ajax_contents";
pub const SITE_URL: &str = "https://www.ittefaq.com.bd";
pub const IMAGE_CDN_BASE: &str = "https://cdn.ittefaqbd.com/contents/cache/images";
const IMAGE_DIMENSIONS: &str = "1100x618x1";
const DEFAULT_COUNT: usize = 20;

static PAGE_RULES: PageRules = PageRules {
    heading: None,
    published: None,
    paragraphs: ".jw_article_body p",
    images: None,
};

static ITEM_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("div.each").unwrap());
static TITLE_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("h2.title > a").unwrap());
static SUMMARY_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("div.summery").unwrap());
static CATEGORY_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("a.category").unwrap());
static TIME_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("span.time").unwrap());
static ARI_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("span[data-ari]").unwrap());

pub struct Ittefaq {
    http: HttpClient,
    api_url: String,
    site_url: String,
    detail: DetailExtractor,
}

impl Ittefaq {
    pub fn new(http: HttpClient) -> Self {
        Self::with_endpoints(http, API_URL, SITE_URL)
    }

    pub fn with_endpoints(
        http: HttpClient,
        api_url: impl Into<String>,
        site_url: impl Into<String>,
    ) -> Self {
        let site_url = site_url.into();
        Self {
            http,
            api_url: api_url.into(),
            detail: DetailExtractor::new(&PAGE_RULES, site_url.clone()),
            site_url,
        }
    }

    fn api_request_url(&self, count: usize) -> String {
        // Filter params are always sent, even when empty.
        format!(
            "{}?widget=476&start=0&count={}&page_id=0&subpage_id=0&author=0&tags=&archive_time=&filter=",
            self.api_url, count
        )
    }
}

#[async_trait]
impl NewsSource for Ittefaq {
    fn id(&self) -> SourceId {
        SourceId::Ittefaq
    }

    #[instrument(level = "info", skip(self))]
    async fn discover(&self, limit: Option<usize>) -> Result<Vec<Article>, FetchError> {
        let count = limit.map_or(DEFAULT_COUNT, |l| l.max(DEFAULT_COUNT));
        let payload: Value = self.http.get_json(&self.api_request_url(count)).await?;

        let fragment = payload.get("html").and_then(Value::as_str).unwrap_or("");
        if fragment.is_empty() {
            info!("Ittefaq returned no HTML fragment");
            return Ok(Vec::new());
        }

        let articles = dedupe_and_limit(articles_from_fragment(fragment, &self.site_url), limit);
        info!(count = articles.len(), "Indexed Ittefaq items");
        Ok(articles)
    }

    async fn enrich(&self, article: &mut Article) {
        let detail = self.detail.fetch(&self.http, &article.url).await;
        debug!(url = %article.url, bytes = detail.body_text.len(), "Fetched Ittefaq body");
        apply_detail(article, detail);
    }
}

/// Parse every `div.each` item of the widget fragment. Untitled items are
/// dropped.
pub fn articles_from_fragment(fragment: &str, site_url: &str) -> Vec<Article> {
    let document = Html::parse_fragment(fragment);
    document
        .select(&ITEM_SEL)
        .filter_map(|item| item_to_article(item, site_url))
        .collect()
}

fn item_to_article(item: ElementRef<'_>, site_url: &str) -> Option<Article> {
    let link = item.select(&TITLE_SEL).next();
    let title = link.map(text_of).unwrap_or_default();
    if title.is_empty() {
        return None;
    }
    let href = link.and_then(|a| a.value().attr("href")).unwrap_or("");

    let mut article = Article::new(SourceId::Ittefaq, title, resolve(href, site_url));

    article.summary = item
        .select(&SUMMARY_SEL)
        .next()
        .map(text_of)
        .filter(|s| !s.is_empty());
    article.category = attr_or_text(item, &CATEGORY_SEL, "title").filter(|s| !s.is_empty());
    article.published_at = attr_or_text(item, &TIME_SEL, "data-published")
        .map(|raw| timestamps::normalize(&raw))
        .unwrap_or_default();
    article.image_url = image_from_ari(item);

    Some(article)
}

/// `attr` of the first match when present and non-empty, else its text.
fn attr_or_text(item: ElementRef<'_>, sel: &Selector, attr: &str) -> Option<String> {
    let el = item.select(sel).next()?;
    match el.value().attr(attr).map(str::trim) {
        Some(value) if !value.is_empty() => Some(value.to_string()),
        _ => Some(text_of(el)),
    }
}

/// Image path from the JSON held in `data-ari`. Bad JSON means no image.
fn image_from_ari(item: ElementRef<'_>) -> String {
    let raw = match item
        .select(&ARI_SEL)
        .next()
        .and_then(|span| span.value().attr("data-ari"))
    {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return String::new(),
    };

    let parsed: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            debug!(error = %e, "Malformed data-ari attribute");
            return String::new();
        }
    };

    match parsed.get("path").and_then(Value::as_str) {
        Some(path) if !path.trim().is_empty() => format!(
            "{}/{}/uploads/{}",
            IMAGE_CDN_BASE,
            IMAGE_DIMENSIONS,
            path.trim().trim_start_matches('/')
        ),
        _ => String::new(),
    }
}

fn text_of(el: ElementRef<'_>) -> String {
    normalize_text(collect_text(el))
}
