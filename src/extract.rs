use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument, warn};

use crate::http::HttpClient;
use crate::image::{ImageRules, ImageSelector};
use crate::models::ArticleDetail;
use crate::timestamps;

// ── Per-portal page layout ───────────────────────────────────────────────────

/// Where the fields of an article page live.
#[derive(Debug)]
pub struct PageRules {
    pub heading: Option<&'static str>,
    pub published: Option<&'static str>,
    /// Paragraphs of the body, container included (e.g. `#container p`).
    pub paragraphs: &'static str,
    pub images: Option<&'static ImageRules>,
}

// ── Detail extraction ────────────────────────────────────────────────────────

pub struct DetailExtractor {
    base_url: String,
    heading: Option<Selector>,
    published: Option<Selector>,
    paragraphs: Selector,
    images: Option<ImageSelector>,
}

impl DetailExtractor {
    pub fn new(rules: &'static PageRules, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            heading: rules.heading.map(|s| Selector::parse(s).unwrap()),
            published: rules.published.map(|s| Selector::parse(s).unwrap()),
            paragraphs: Selector::parse(rules.paragraphs).unwrap(),
            images: rules.images.map(ImageSelector::new),
        }
    }

    /// Fetch and parse one article page. Never fails: a network or upstream
    /// error yields an otherwise empty record whose body explains what broke.
    #[instrument(level = "debug", skip(self, http))]
    pub async fn fetch(&self, http: &HttpClient, url: &str) -> ArticleDetail {
        match http.get_html(url).await {
            Ok(html) => self.parse(&html),
            Err(e) => {
                warn!(%url, error = %e, "Article fetch failed");
                ArticleDetail::failed(e)
            }
        }
    }

    pub fn parse(&self, html: &str) -> ArticleDetail {
        let document = Html::parse_document(html);

        let heading = self
            .heading
            .as_ref()
            .map(|sel| first_text(&document, sel))
            .unwrap_or_default();

        let published_raw = self
            .published
            .as_ref()
            .map(|sel| first_text(&document, sel))
            .unwrap_or_default();
        let published_at = timestamps::normalize(&published_raw);
        if published_at.is_empty() && !published_raw.is_empty() {
            debug!(raw = %published_raw, "Unrecognized publish time");
        }

        let image_url = self
            .images
            .as_ref()
            .map(|images| images.select_image(&document, &self.base_url))
            .unwrap_or_default();

        ArticleDetail {
            heading,
            published_at,
            image_url,
            body_text: body_text(&document, &self.paragraphs),
        }
    }
}

/// Text of every matched paragraph, whitespace-collapsed, empty ones
/// dropped, joined with one blank line.
pub fn body_text(document: &Html, paragraphs: &Selector) -> String {
    document
        .select(paragraphs)
        .map(|p| normalize_text(collect_text(p)))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

// ── DOM utility helpers ──────────────────────────────────────────────────────

/// Normalized text of the first element matching `sel`, or empty.
pub fn first_text(document: &Html, sel: &Selector) -> String {
    document
        .select(sel)
        .next()
        .map(|el| normalize_text(collect_text(el)))
        .unwrap_or_default()
}

/// Recursively collect all text from an element and its descendants.
pub fn collect_text(el: ElementRef<'_>) -> String {
    use scraper::node::Node;
    let mut parts = Vec::new();
    for child in el.children() {
        match child.value() {
            Node::Text(text) => parts.push((&*text.text).to_string()),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    parts.push(collect_text(child_el));
                }
            }
            _ => {}
        }
    }
    parts.join("")
}

/// Collapse whitespace and trim.
pub fn normalize_text(text: String) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::image::DAILY_STAR_RULES;

    static RULES: PageRules = PageRules {
        heading: Some(".article-title"),
        published: Some(".color-iron"),
        paragraphs: ".clearfix p",
        images: Some(&DAILY_STAR_RULES),
    };

    const PAGE: &str = r#"<html><body>
        <h1 class="article-title">  Floods   recede in Sylhet </h1>
        <div class="color-iron">Sun Oct 19, 2025 11:32 AM</div>
        <picture><source srcset="https://tds-images.thedailystar.net/styles/big_202/flood.jpg 1x"></picture>
        <div class="clearfix">
            <p>First <b>paragraph</b>.</p>
            <p>   </p>
            <p>
                Second
                paragraph.
            </p>
        </div>
    </body></html>"#;

    fn extractor() -> DetailExtractor {
        DetailExtractor::new(&RULES, "https://www.thedailystar.net")
    }

    #[test]
    fn test_parse_all_fields() {
        let detail = extractor().parse(PAGE);
        assert_eq!(detail.heading, "Floods recede in Sylhet");
        assert_eq!(detail.published_at, "2025-10-19T05:32:00Z");
        assert_eq!(
            detail.image_url,
            "https://tds-images.thedailystar.net/styles/big_202/flood.jpg"
        );
        assert_eq!(detail.body_text, "First paragraph.\n\nSecond paragraph.");
    }

    #[test]
    fn test_missing_fields_are_empty() {
        let detail = extractor().parse("<html><body><p>stray</p></body></html>");
        assert_eq!(detail, ArticleDetail::default());
    }

    #[test]
    fn test_parse_twice_is_identical() {
        assert_eq!(extractor().parse(PAGE), extractor().parse(PAGE));
    }

    #[tokio::test]
    async fn test_fetch_failure_yields_placeholder() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/gone")
            .with_status(500)
            .create_async()
            .await;
        let http = HttpClient::new(&Config::default()).unwrap();

        let detail = extractor()
            .fetch(&http, &format!("{}/gone", server.url()))
            .await;
        assert_eq!(detail.body_text, "Error fetching article: Upstream returned status 500");
        assert!(detail.heading.is_empty());
        assert!(detail.image_url.is_empty());
    }
}
