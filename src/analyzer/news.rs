use crate::analyzer::Analyzer;
use crate::model::{AnalysisResult, AnalyzerError, AnalyzerKind, Competitor, Findings};
use crate::parser::parse_news_feed;
use crate::scraper::Fetcher;

use tracing::{info, warn};
use url::form_urlencoded;

/// Recent mentions from a news search feed keyed by the competitor name.
pub struct NewsAnalyzer {
    fetcher: Fetcher,
    feed_url_template: String,
    max_items: usize,
}

impl NewsAnalyzer {
    pub fn new(fetcher: Fetcher, feed_url_template: impl Into<String>, max_items: usize) -> Self {
        Self {
            fetcher,
            feed_url_template: feed_url_template.into(),
            max_items,
        }
    }

    pub fn feed_url(&self, query: &str) -> String {
        let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
        self.feed_url_template.replace("{query}", &encoded)
    }

    async fn run(&self, competitor: &Competitor) -> Result<Findings, AnalyzerError> {
        let url = self.feed_url(&competitor.name);
        let body = self.fetcher.fetch(&url).await?;
        let findings = parse_news_feed(&body, self.max_items)?;
        info!(
            "📰 {} mentions of {} ({} kept)",
            findings.total_mentions,
            competitor.name,
            findings.mentions.len()
        );
        Ok(Findings::News(findings))
    }
}

#[async_trait::async_trait]
impl Analyzer for NewsAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::News
    }

    async fn analyze(&self, competitor: &Competitor) -> AnalysisResult {
        info!("📰 News analysis for {}", competitor.name);
        let result = AnalysisResult::from_outcome(self.kind(), &competitor.name, self.run(competitor).await);
        if let Some(err) = result.error() {
            warn!("News analysis for {} failed: {}", competitor.name, err);
        }
        result
    }
}
