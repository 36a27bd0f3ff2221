// RSS/Atom news feed parsing
use crate::model::{NewsFindings, NewsMention, ParseError};
use crate::utils::{squash_whitespace, truncate_chars};

use scraper::Html;

const SNIPPET_MAX_CHARS: usize = 200;

/// Parses a news feed into mentions, newest first (undated entries last),
/// keeping at most `max_items`. An empty feed is a valid, empty result.
pub fn parse_news_feed(body: &str, max_items: usize) -> Result<NewsFindings, ParseError> {
    let feed = feed_rs::parser::parse(body.as_bytes()).map_err(|e| ParseError::Feed(e.to_string()))?;

    let mut mentions: Vec<NewsMention> = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let link = entry
                .links
                .first()
                .map(|l| l.href.clone())
                .or_else(|| entry.id.starts_with("http").then(|| entry.id.clone()))?;

            let title = entry
                .title
                .map(|t| squash_whitespace(&t.content))
                .filter(|t| !t.is_empty())?;

            let snippet = entry
                .summary
                .map(|s| strip_markup(&s.content))
                .filter(|s| !s.is_empty())
                .map(|s| truncate_chars(&s, SNIPPET_MAX_CHARS));

            Some(NewsMention {
                source: source_from_title(&title),
                title,
                link,
                published_at: entry.published.or(entry.updated),
                snippet,
            })
        })
        .collect();

    mentions.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    let total_mentions = mentions.len();
    mentions.truncate(max_items);

    Ok(NewsFindings {
        mentions,
        total_mentions,
    })
}

/// News aggregators append the publisher to the headline: "Acme raises $10M - Reuters".
fn source_from_title(title: &str) -> Option<String> {
    let (_, source) = title.rsplit_once(" - ")?;
    let source = source.trim();
    (!source.is_empty() && source.len() <= 60).then(|| source.to_string())
}

fn strip_markup(fragment: &str) -> String {
    let parsed = Html::parse_fragment(fragment);
    squash_whitespace(&parsed.root_element().text().collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>"Acme" - Google News</title>
    <link>https://news.google.com</link>
    <description>Google News</description>
    <item>
      <title>Acme opens new factory - Daily Planet</title>
      <link>https://news.test/factory</link>
      <pubDate>Mon, 01 Jan 2024 10:00:00 GMT</pubDate>
      <description>&lt;a href="https://news.test/factory"&gt;Acme opens new factory&lt;/a&gt; in the desert</description>
    </item>
    <item>
      <title>Acme recalls rocket skates - Gazette</title>
      <link>https://news.test/recall</link>
      <pubDate>Wed, 03 Jan 2024 08:30:00 GMT</pubDate>
    </item>
    <item>
      <title>Undated Acme story</title>
      <link>https://news.test/undated</link>
    </item>
    <item>
      <title>Acme hires coyote - Bugle</title>
      <link>https://news.test/hire</link>
      <pubDate>Tue, 02 Jan 2024 12:00:00 GMT</pubDate>
    </item>
  </channel>
</rss>"#;

    const EMPTY_FEED: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>Nothing</title><link>https://news.test</link><description>none</description></channel></rss>"#;

    const ATOM_FEED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Acme mentions</title>
  <id>urn:acme:news</id>
  <updated>2024-02-02T09:00:00Z</updated>
  <entry>
    <title>Acme ships anvil v2 - Wire</title>
    <id>urn:acme:1</id>
    <link href="https://news.test/anvil-v2"/>
    <updated>2024-02-01T09:00:00Z</updated>
    <summary type="html">&lt;p&gt;hello   world&lt;/p&gt;</summary>
  </entry>
  <entry>
    <title>Acme earnings call</title>
    <id>urn:acme:2</id>
    <link href="https://news.test/earnings"/>
    <published>2024-02-02T08:00:00Z</published>
    <updated>2024-02-02T09:00:00Z</updated>
  </entry>
</feed>"#;

    #[test]
    fn mentions_are_newest_first_with_undated_last() {
        let findings = parse_news_feed(FEED, 20).unwrap();
        let links: Vec<_> = findings.mentions.iter().map(|m| m.link.as_str()).collect();
        assert_eq!(
            links,
            vec![
                "https://news.test/recall",
                "https://news.test/hire",
                "https://news.test/factory",
                "https://news.test/undated",
            ]
        );
        assert_eq!(findings.total_mentions, 4);
        assert_eq!(
            findings.mentions[0].published_at,
            Some(Utc.with_ymd_and_hms(2024, 1, 3, 8, 30, 0).unwrap())
        );
    }

    #[test]
    fn source_and_snippet_are_extracted() {
        let findings = parse_news_feed(FEED, 20).unwrap();
        let factory = findings
            .mentions
            .iter()
            .find(|m| m.link.ends_with("factory"))
            .unwrap();
        assert_eq!(factory.source.as_deref(), Some("Daily Planet"));
        assert_eq!(
            factory.snippet.as_deref(),
            Some("Acme opens new factory in the desert")
        );
        let undated = findings.mentions.last().unwrap();
        assert!(undated.source.is_none());
        assert!(undated.published_at.is_none());
    }

    #[test]
    fn result_is_capped_but_total_is_kept() {
        let findings = parse_news_feed(FEED, 2).unwrap();
        assert_eq!(findings.mentions.len(), 2);
        assert_eq!(findings.total_mentions, 4);
    }

    #[test]
    fn empty_feed_is_empty_result() {
        let findings = parse_news_feed(EMPTY_FEED, 20).unwrap();
        assert!(findings.mentions.is_empty());
        assert_eq!(findings.total_mentions, 0);
    }

    #[test]
    fn atom_entries_are_parsed() {
        let findings = parse_news_feed(ATOM_FEED, 20).unwrap();
        assert_eq!(findings.total_mentions, 2);

        let earnings = &findings.mentions[0];
        assert_eq!(earnings.link, "https://news.test/earnings");
        assert_eq!(
            earnings.published_at,
            Some(Utc.with_ymd_and_hms(2024, 2, 2, 8, 0, 0).unwrap())
        );
        assert!(earnings.source.is_none());
        assert!(earnings.snippet.is_none());

        let anvil = &findings.mentions[1];
        assert_eq!(anvil.link, "https://news.test/anvil-v2");
        assert_eq!(
            anvil.published_at,
            Some(Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap())
        );
        assert_eq!(anvil.source.as_deref(), Some("Wire"));
        assert_eq!(anvil.snippet.as_deref(), Some("hello world"));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(
            parse_news_feed("<html>not a feed</html>", 20),
            Err(ParseError::Feed(_))
        ));
    }
}
