use std::collections::HashSet;

use scraper::{Html, Selector};

use crate::extract::{collect_text, normalize_text};
use crate::models::{Article, Heading};
use crate::urls::resolve;

/// Anything a listing yields: it has a title and an absolute URL.
pub trait Listed {
    fn title(&self) -> &str;
    fn url(&self) -> &str;
}

impl Listed for Heading {
    fn title(&self) -> &str {
        &self.title
    }
    fn url(&self) -> &str {
        &self.url
    }
}

impl Listed for Article {
    fn title(&self) -> &str {
        &self.title
    }
    fn url(&self) -> &str {
        &self.url
    }
}

/// Drop untitled or URL-less items and repeated URLs (first one wins), then
/// truncate to `limit`.
pub fn dedupe_and_limit<T, I>(items: I, limit: Option<usize>) -> Vec<T>
where
    T: Listed,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| !item.title().is_empty() && !item.url().is_empty())
        .filter(|item| seen.insert(item.url().to_string()))
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}

/// Every `(text, href)` of the links matched by `links`, hrefs resolved
/// against `base_url`. Order follows the document.
pub fn headings_from_html(html: &str, links: &Selector, base_url: &str) -> Vec<Heading> {
    let document = Html::parse_document(html);
    document
        .select(links)
        .map(|a| Heading {
            title: normalize_text(collect_text(a)),
            url: resolve(a.value().attr("href").unwrap_or(""), base_url),
        })
        .collect()
}
