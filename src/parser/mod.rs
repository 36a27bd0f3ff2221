// Source-specific extraction. Everything here is synchronous and works on
// already fetched bodies, so parsed documents never live across an await.
pub mod feed;
pub mod page;
pub mod profile;

use crate::model::ParseError;
use scraper::{ElementRef, Html, Selector};

pub use feed::parse_news_feed;
pub use page::{extract_seo_findings, extract_web_findings};
pub use profile::parse_profile;

pub(crate) fn selector(css: &str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|_| ParseError::Selector(css.to_string()))
}

pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    crate::utils::squash_whitespace(&element.text().collect::<String>())
}

pub(crate) fn first_text(document: &Html, css: &str) -> Result<Option<String>, ParseError> {
    let sel = selector(css)?;
    Ok(document
        .select(&sel)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty()))
}

/// Content of the first `<meta>` whose `attr` equals `key` (case-insensitive).
pub(crate) fn meta_content(document: &Html, attr: &str, key: &str) -> Result<Option<String>, ParseError> {
    let sel = selector("meta")?;
    Ok(document
        .select(&sel)
        .filter(|m| {
            m.value()
                .attr(attr)
                .is_some_and(|v| v.trim().eq_ignore_ascii_case(key))
        })
        .filter_map(|m| m.value().attr("content"))
        .map(|c| c.trim().to_string())
        .find(|c| !c.is_empty()))
}
