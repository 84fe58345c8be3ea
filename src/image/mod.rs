//! Representative-image selection for scraped article pages.
//!
//! Article templates on the portals mix hero photos, byline thumbnails and
//! in-house branding inside the same `<picture>` groupings, so the choice is
//! made in two steps: [`classify`] flags every grouping against a portal's
//! [`ImageRules`], and [`select::ImageSelector`] walks the flagged groupings
//! (after a fast hero-element check, before a last-resort gallery lookup).

pub mod classify;
pub mod select;

pub use select::ImageSelector;

/// Per-portal conventions the classifier and selector work from.
#[derive(Debug)]
pub struct ImageRules {
    /// CDN host serving genuine article photos.
    pub content_host: &'static str,
    /// Host reserved for logos and in-house imagery; never selected.
    pub logo_host: &'static str,
    /// Path fragments that mark byline photos or small thumbnails.
    pub author_markers: &'static [&'static str],
    /// Path fragment of the large rendition.
    pub large_marker: &'static str,
    /// Hero gallery element checked before any candidate scan.
    pub hero_selector: &'static str,
    pub hero_attr: &'static str,
    /// Last-resort `<picture>` lookup and the lazy-load marker it must contain.
    pub gallery_picture_selector: &'static str,
    pub lazy_img_selector: &'static str,
}

pub const DAILY_STAR_RULES: ImageRules = ImageRules {
    content_host: "tds-images.thedailystar.net",
    logo_host: "tds-images-bn.thedailystar.net",
    author_markers: &["author", "/small_"],
    large_marker: "/big_",
    hero_selector: ".section-media .lg-gallery",
    hero_attr: "data-src",
    gallery_picture_selector: ".lg-gallery picture",
    lazy_img_selector: "img.lazyloaded",
};

// ── Size-hinted expression helpers ───────────────────────────────────────────

/// First URL of a `srcset`-style expression: everything before the first
/// comma, then before the first whitespace.
pub fn first_url(expression: &str) -> &str {
    expression
        .split(',')
        .next()
        .unwrap_or("")
        .split_whitespace()
        .next()
        .unwrap_or("")
}

/// Every URL named in a `srcset`-style expression, descriptors dropped.
pub fn expression_urls(expression: &str) -> impl Iterator<Item = &str> {
    expression
        .split(',')
        .filter_map(|part| part.split_whitespace().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_url_from_srcset() {
        assert_eq!(
            first_url("https://a.example/big_1.jpg 1x, https://a.example/big_2.jpg 2x"),
            "https://a.example/big_1.jpg"
        );
        assert_eq!(first_url("//a.example/p.jpg 640w"), "//a.example/p.jpg");
        assert_eq!(first_url("  /p.jpg  "), "/p.jpg");
        assert_eq!(first_url(""), "");
    }

    #[test]
    fn test_expression_urls_skip_descriptors() {
        let urls: Vec<&str> = expression_urls("a.jpg 1x, b.jpg 2x,").collect();
        assert_eq!(urls, vec!["a.jpg", "b.jpg"]);
    }
}
