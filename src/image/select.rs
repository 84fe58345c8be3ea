use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::classify::classify;
use super::{first_url, ImageRules};
use crate::urls::{host_of, resolve};

const EXPRESSION_ATTRS: [&str; 4] = ["srcset", "data-srcset", "src", "data-src"];

static PICTURE_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("picture").unwrap());
static HINTED_SOURCE_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("source[srcset], source[data-srcset]").unwrap());
static HINTED_IMG_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img[srcset], img[data-srcset]").unwrap());

/// Picks the one representative image of an article page.
pub struct ImageSelector {
    rules: &'static ImageRules,
    hero: Selector,
    gallery_picture: Selector,
    lazy_img: Selector,
}

impl ImageSelector {
    pub fn new(rules: &'static ImageRules) -> Self {
        Self {
            rules,
            hero: Selector::parse(rules.hero_selector).unwrap(),
            gallery_picture: Selector::parse(rules.gallery_picture_selector).unwrap(),
            lazy_img: Selector::parse(rules.lazy_img_selector).unwrap(),
        }
    }

    /// Absolute image URL, or an empty string when nothing suitable exists.
    pub fn select_image(&self, document: &Html, base_url: &str) -> String {
        self.hero_image(document, base_url)
            .or_else(|| self.scan_candidates(document, base_url))
            .or_else(|| self.gallery_fallback(document, base_url))
            .unwrap_or_default()
    }

    fn hero_image(&self, document: &Html, base_url: &str) -> Option<String> {
        let raw = document
            .select(&self.hero)
            .next()?
            .value()
            .attr(self.rules.hero_attr)?;
        self.accept(resolve(first_url(raw), base_url))
    }

    /// First acceptable URL among the ranked pictures. A rejected candidate
    /// (placeholder, logo) hands over to the next one.
    fn scan_candidates(&self, document: &Html, base_url: &str) -> Option<String> {
        let mut candidates: Vec<(u8, ElementRef<'_>)> = Vec::new();
        for picture in document.select(&PICTURE_SEL) {
            let c = classify(picture, self.rules);
            if c.should_skip && !c.is_valid_article_image {
                continue;
            }
            candidates.push((c.priority, picture));
        }
        debug!(candidates = candidates.len(), "Classified picture elements");

        // Stable: equal priorities keep document order.
        candidates.sort_by_key(|(priority, _)| *priority);

        candidates.into_iter().find_map(|(_, picture)| {
            self.expression_in(picture)
                .map(|raw| resolve(raw, base_url))
                .and_then(|url| self.accept(url))
        })
    }

    fn gallery_fallback(&self, document: &Html, base_url: &str) -> Option<String> {
        document
            .select(&self.gallery_picture)
            .filter(|p| p.select(&self.lazy_img).next().is_some())
            .find_map(|picture| {
                self.expression_in(picture)
                    .map(|raw| resolve(raw, base_url))
                    .and_then(|url| self.accept(url))
            })
    }

    /// First URL of the preferred size-hinted element, `<source>` before `<img>`.
    fn expression_in<'a>(&self, picture: ElementRef<'a>) -> Option<&'a str> {
        let element = picture
            .select(&HINTED_SOURCE_SEL)
            .next()
            .or_else(|| picture.select(&HINTED_IMG_SEL).next())?;
        let v = element.value();
        let expression = EXPRESSION_ATTRS
            .iter()
            .filter_map(|a| v.attr(a))
            .find(|s| !s.trim().is_empty())?;
        let url = first_url(expression);
        (!url.is_empty()).then_some(url)
    }

    /// Rejects anything hosted on the logo domain or not absolute.
    fn accept(&self, url: String) -> Option<String> {
        if !url.starts_with("http") {
            return None;
        }
        if host_of(&url).as_deref() == Some(self.rules.logo_host) {
            debug!(%url, "Dropping site-logo image");
            return None;
        }
        Some(url)
    }
}
