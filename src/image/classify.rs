use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};

use super::{expression_urls, ImageRules};
use crate::urls::host_of;

pub const PRIORITY_LARGE: u8 = 0;
pub const PRIORITY_DEFAULT: u8 = 1;

static SOURCE_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("source").unwrap());
static IMG_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());

/// What a `<picture>` grouping was found to contain.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CandidateFlags {
    /// At least one expression points at the content host without a byline marker.
    pub content_image: bool,
    /// At least one content-host expression carries a byline/thumbnail marker.
    pub author_thumbnail: bool,
    /// At least one expression points at the logo host.
    pub site_logo: bool,
}

impl CandidateFlags {
    /// A grouping holding a real photo next to a byline photo is kept.
    pub fn should_skip(self) -> bool {
        self.site_logo || (self.author_thumbnail && !self.content_image)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub is_valid_article_image: bool,
    pub should_skip: bool,
    /// Lower wins.
    pub priority: u8,
}

pub fn classify(picture: ElementRef<'_>, rules: &ImageRules) -> Classification {
    let expressions = size_hinted_expressions(picture);
    let flags = flags_for(expressions.iter().copied(), rules);
    Classification {
        is_valid_article_image: flags.content_image,
        should_skip: flags.should_skip(),
        priority: priority_for(expressions.iter().copied(), rules),
    }
}

pub fn flags_for<'a, I>(expressions: I, rules: &ImageRules) -> CandidateFlags
where
    I: IntoIterator<Item = &'a str>,
{
    let mut flags = CandidateFlags::default();
    for expression in expressions {
        let lower = expression.to_lowercase();
        if mentions_host(&lower, rules.content_host) {
            if rules.author_markers.iter().any(|m| lower.contains(m)) {
                flags.author_thumbnail = true;
            } else {
                flags.content_image = true;
            }
        } else if mentions_host(&lower, rules.logo_host) {
            flags.site_logo = true;
        }
    }
    flags
}

pub fn priority_for<'a, I>(expressions: I, rules: &ImageRules) -> u8
where
    I: IntoIterator<Item = &'a str>,
{
    let large = expressions
        .into_iter()
        .any(|e| e.to_lowercase().contains(rules.large_marker));
    if large {
        PRIORITY_LARGE
    } else {
        PRIORITY_DEFAULT
    }
}

/// `srcset`/`data-srcset` values of every `<source>` then every `<img>`.
pub fn size_hinted_expressions<'a>(picture: ElementRef<'a>) -> Vec<&'a str> {
    picture
        .select(&SOURCE_SEL)
        .chain(picture.select(&IMG_SEL))
        .filter_map(|el| {
            let v = el.value();
            v.attr("srcset")
                .filter(|s| !s.trim().is_empty())
                .or_else(|| v.attr("data-srcset"))
        })
        .filter(|s| !s.trim().is_empty())
        .collect()
}

fn mentions_host(expression: &str, host: &str) -> bool {
    expression_urls(expression).any(|u| host_of(u).as_deref() == Some(host))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::DAILY_STAR_RULES;
    use scraper::Html;

    const CONTENT: &str = "https://tds-images.thedailystar.net/sites/default/files/styles/big_201/public/images/a.jpg";
    const AUTHOR: &str = "https://tds-images.thedailystar.net/sites/default/files/author/jane.jpg";
    const SMALL: &str = "https://tds-images.thedailystar.net/sites/default/files/styles/small_1/public/b.jpg";
    const LOGO: &str = "https://tds-images-bn.thedailystar.net/logo.png";

    fn flags(expressions: &[&str]) -> CandidateFlags {
        flags_for(expressions.iter().copied(), &DAILY_STAR_RULES)
    }

    #[test]
    fn test_content_host_marks_valid() {
        let f = flags(&[CONTENT]);
        assert!(f.content_image);
        assert!(!f.should_skip());
    }

    #[test]
    fn test_author_only_is_skipped() {
        let f = flags(&[AUTHOR]);
        assert!(f.author_thumbnail);
        assert!(!f.content_image);
        assert!(f.should_skip());

        assert!(flags(&[SMALL]).should_skip());
    }

    #[test]
    fn test_author_next_to_content_is_kept() {
        let f = flags(&[AUTHOR, CONTENT]);
        assert!(f.content_image);
        assert!(f.author_thumbnail);
        assert!(!f.should_skip());
    }

    #[test]
    fn test_logo_host_always_skips() {
        assert!(flags(&[LOGO]).should_skip());
        assert!(flags(&[LOGO, CONTENT]).should_skip());
    }

    #[test]
    fn test_unrelated_host_sets_nothing() {
        let f = flags(&["https://ads.example.com/banner.jpg 1x"]);
        assert_eq!(f, CandidateFlags::default());
        assert!(!f.should_skip());
    }

    #[test]
    fn test_logo_host_is_not_a_content_host_prefix_match() {
        let f = flags(&["//tds-images-bn.thedailystar.net/x/big_logo.png 1x"]);
        assert!(!f.content_image);
        assert!(f.site_logo);
    }

    #[test]
    fn test_priority_prefers_large_marker() {
        assert_eq!(priority_for([CONTENT], &DAILY_STAR_RULES), PRIORITY_LARGE);
        assert_eq!(priority_for([SMALL], &DAILY_STAR_RULES), PRIORITY_DEFAULT);
        assert_eq!(
            priority_for(std::iter::empty::<&str>(), &DAILY_STAR_RULES),
            PRIORITY_DEFAULT
        );
    }

    #[test]
    fn test_classify_reads_source_and_img_attributes() {
        let html = format!(
            r#"<picture>
                <source data-srcset="{author} 1x">
                <img srcset="{content} 1x, {content} 2x">
            </picture>"#,
            author = AUTHOR,
            content = CONTENT,
        );
        let doc = Html::parse_fragment(&html);
        let picture = doc
            .select(&Selector::parse("picture").unwrap())
            .next()
            .unwrap();

        let c = classify(picture, &DAILY_STAR_RULES);
        assert!(c.is_valid_article_image);
        assert!(!c.should_skip);
        assert_eq!(c.priority, PRIORITY_LARGE);
    }
}
