// Homepage extraction for the web and SEO analyzers
use crate::model::{HeadingSummary, ParseError, SeoFindings, WebFindings};
use crate::parser::{element_text, first_text, meta_content, selector};

use scraper::Html;
use std::collections::BTreeMap;
use url::Url;

const MAX_WEB_HEADINGS: usize = 20;
const MAX_H2_TAGS: usize = 10;
const MAX_HEADING_ORDER: usize = 50;
const MAX_STRUCTURED_DATA: usize = 5;

const TECH_SIGNATURES: &[(&str, &[&str])] = &[
    ("React", &["react", "_reactrootcontainer", "data-reactroot"]),
    ("Vue.js", &["vue", "__vue__", "data-v-"]),
    ("Angular", &["ng-", "angular", "_ngcontent"]),
    ("jQuery", &["jquery"]),
    ("Bootstrap", &["bootstrap"]),
    ("Tailwind", &["tailwind"]),
    ("WordPress", &["wp-content", "wp-includes"]),
    ("Shopify", &["shopify", "cdn.shopify"]),
    ("Next.js", &["_next", "__next_data__"]),
    ("Gatsby", &["gatsby"]),
];

/// Extracts page-level signals. Missing elements leave their field empty;
/// html5ever recovers from malformed markup, so this only fails on
/// internal selector errors.
pub fn extract_web_findings(html: &str, page_url: &Url) -> Result<WebFindings, ParseError> {
    let document = Html::parse_document(html);

    let title = first_text(&document, "title")?;
    let description = meta_content(&document, "name", "description")?;
    let (internal_links, external_links) = count_links(&document, page_url)?;
    let has_structured_data = has_structured_data(&document)?;

    let heading_sel = selector("h1, h2, h3")?;
    let headings = document
        .select(&heading_sel)
        .filter_map(|h| {
            let text = element_text(h);
            (!text.is_empty()).then(|| format!("{}: {}", h.value().name(), text))
        })
        .take(MAX_WEB_HEADINGS)
        .collect();

    let img_sel = selector("img")?;
    let images_count = document.select(&img_sel).count();

    Ok(WebFindings {
        title,
        description,
        internal_links,
        external_links,
        has_structured_data,
        headings,
        images_count,
        technologies: detect_technologies(html),
        page_size_bytes: html.len(),
        load_time_ms: 0,
    })
}

/// Extracts on-page SEO signals. Probe results (robots.txt, sitemap) are
/// filled in by the caller.
pub fn extract_seo_findings(html: &str) -> Result<SeoFindings, ParseError> {
    let document = Html::parse_document(html);

    let meta_title = first_text(&document, "title")?;
    let meta_description = meta_content(&document, "name", "description")?;
    let meta_keywords = meta_content(&document, "name", "keywords")?
        .map(|k| {
            k.split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let heading_sel = selector("h1, h2, h3, h4, h5, h6")?;
    let mut headings = HeadingSummary::default();
    let mut previous: Option<u8> = None;
    let mut h1_tags = Vec::new();
    let mut h2_tags = Vec::new();
    for heading in document.select(&heading_sel) {
        let Some(level) = heading_level(heading.value().name()) else {
            continue;
        };
        match level {
            1 => headings.h1 += 1,
            2 => headings.h2 += 1,
            3 => headings.h3 += 1,
            4 => headings.h4 += 1,
            5 => headings.h5 += 1,
            _ => headings.h6 += 1,
        }
        if previous.is_some_and(|p| level > p + 1) {
            headings.skips_levels = true;
        }
        previous = Some(level);
        if headings.order.len() < MAX_HEADING_ORDER {
            headings.order.push(level);
        }

        let text = element_text(heading);
        if text.is_empty() {
            continue;
        }
        match level {
            1 => h1_tags.push(text),
            2 if h2_tags.len() < MAX_H2_TAGS => h2_tags.push(text),
            _ => {}
        }
    }

    let link_sel = selector("link[rel][href]")?;
    let canonical_url = document
        .select(&link_sel)
        .find(|l| {
            l.value()
                .attr("rel")
                .is_some_and(|rel| rel.split_whitespace().any(|r| r.eq_ignore_ascii_case("canonical")))
        })
        .and_then(|l| l.value().attr("href"))
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty());

    let robots_meta = meta_content(&document, "name", "robots")?;

    let og_sel = selector("meta[property]")?;
    let mut og_tags = BTreeMap::new();
    for tag in document.select(&og_sel) {
        let property = tag.value().attr("property").unwrap_or_default().trim();
        let content = tag.value().attr("content").unwrap_or_default().trim();
        if property.starts_with("og:") && !content.is_empty() {
            og_tags.insert(property.to_string(), content.to_string());
        }
    }

    let ld_sel = selector(r#"script[type="application/ld+json"]"#)?;
    let structured_data = document
        .select(&ld_sel)
        .filter_map(|s| serde_json::from_str::<serde_json::Value>(&s.text().collect::<String>()).ok())
        .take(MAX_STRUCTURED_DATA)
        .collect();

    Ok(SeoFindings {
        title_length: meta_title.as_ref().map(|t| t.chars().count()),
        meta_description_length: meta_description.as_ref().map(|d| d.chars().count()),
        headings,
        has_robots_txt: false,
        has_sitemap: false,
        canonical_url,
        meta_title,
        meta_description,
        meta_keywords,
        h1_tags,
        h2_tags,
        robots_meta,
        og_tags,
        structured_data,
    })
}

fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

fn count_links(document: &Html, page_url: &Url) -> Result<(usize, usize), ParseError> {
    let sel = selector("a[href]")?;
    let own_host = page_url.host_str().map(strip_www);

    let mut internal = 0;
    let mut external = 0;
    for anchor in document.select(&sel) {
        let href = anchor.value().attr("href").unwrap_or_default().trim();
        if href.is_empty() || href.starts_with('#') {
            continue;
        }
        let lowered = href.to_ascii_lowercase();
        if ["mailto:", "tel:", "javascript:", "data:"]
            .iter()
            .any(|p| lowered.starts_with(p))
        {
            continue;
        }
        let Ok(target) = page_url.join(href) else {
            continue;
        };
        if target.scheme() != "http" && target.scheme() != "https" {
            continue;
        }
        if target.host_str().map(strip_www) == own_host {
            internal += 1;
        } else {
            external += 1;
        }
    }
    Ok((internal, external))
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

fn has_structured_data(document: &Html) -> Result<bool, ParseError> {
    let json_ld = selector(r#"script[type="application/ld+json"]"#)?;
    let microdata = selector("[itemscope], [itemtype]")?;
    Ok(document.select(&json_ld).next().is_some() || document.select(&microdata).next().is_some())
}

fn detect_technologies(html: &str) -> Vec<String> {
    let lowered = html.to_lowercase();
    TECH_SIGNATURES
        .iter()
        .filter(|(_, signatures)| signatures.iter().any(|s| lowered.contains(s)))
        .map(|(tech, _)| tech.to_string())
        .collect()
}
