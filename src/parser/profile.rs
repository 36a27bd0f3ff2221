// Public social profile page parsing
use crate::model::{ParseError, SocialPlatform, SocialProfile};
use crate::parser::{element_text, first_text, meta_content, selector};
use crate::utils::{find_labelled_count, squash_whitespace, truncate_chars};

use scraper::Html;

const BIO_MAX_CHARS: usize = 200;

/// Extracts the coarse, unauthenticated signals of a profile page. Signals
/// that are not present in the markup stay `None`.
pub fn parse_profile(
    html: &str,
    platform: SocialPlatform,
    handle: &str,
    profile_url: &str,
) -> Result<SocialProfile, ParseError> {
    let document = Html::parse_document(html);

    let display_name = meta_content(&document, "property", "og:title")?
        .or(first_text(&document, "title")?)
        .and_then(|t| display_name_from_title(&t));

    let about_sel = selector("section[class*=about], div[class*=about]")?;
    let about = document
        .select(&about_sel)
        .map(element_text)
        .find(|t| !t.is_empty());

    let og_description = meta_content(&document, "property", "og:description")?;
    let meta_description = meta_content(&document, "name", "description")?;
    let bio = og_description
        .clone()
        .or_else(|| meta_description.clone())
        .or(about)
        .map(|b| truncate_chars(&b, BIO_MAX_CHARS));

    let body_sel = selector("body")?;
    let body_text = document
        .select(&body_sel)
        .next()
        .map(element_text)
        .unwrap_or_default();
    let haystack = squash_whitespace(&format!(
        "{} {} {}",
        og_description.unwrap_or_default(),
        meta_description.unwrap_or_default(),
        body_text
    ));

    Ok(SocialProfile {
        platform,
        handle: handle.to_string(),
        profile_url: profile_url.to_string(),
        display_name,
        bio,
        followers: find_labelled_count(&haystack, &["followers"]),
        following: find_labelled_count(&haystack, &["following"]),
        posts: find_labelled_count(&haystack, &["posts", "tweets"]),
    })
}

/// Profile titles look like "Acme Corp | LinkedIn" or "Acme (@acme) / X".
fn display_name_from_title(title: &str) -> Option<String> {
    let name = title.split(['|', '(']).next().unwrap_or_default().trim();
    (!name.is_empty()).then(|| name.to_string())
}
