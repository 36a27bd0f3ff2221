use crate::analyzer::{Analyzer, homepage_url};
use crate::model::{AnalysisResult, AnalyzerError, AnalyzerKind, Competitor, Findings};
use crate::parser::extract_web_findings;
use crate::scraper::Fetcher;

use std::time::Instant;
use tracing::{info, warn};

/// Homepage content: title, description, link mix, structured data.
pub struct WebAnalyzer {
    fetcher: Fetcher,
}

impl WebAnalyzer {
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }

    async fn run(&self, competitor: &Competitor) -> Result<Findings, AnalyzerError> {
        let page_url = homepage_url(competitor)?;

        let started = Instant::now();
        let html = self.fetcher.fetch(page_url.as_str()).await?;
        let load_time_ms = started.elapsed().as_millis() as u64;

        let mut findings = extract_web_findings(&html, &page_url)?;
        findings.load_time_ms = load_time_ms;
        Ok(Findings::Web(findings))
    }
}

#[async_trait::async_trait]
impl Analyzer for WebAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Web
    }

    async fn analyze(&self, competitor: &Competitor) -> AnalysisResult {
        info!("🌐 Web analysis for {} ({})", competitor.name, competitor.url);
        let result = AnalysisResult::from_outcome(self.kind(), &competitor.name, self.run(competitor).await);
        if let Some(err) = result.error() {
            warn!("Web analysis for {} failed: {}", competitor.name, err);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::test_support::unthrottled;
    use crate::scraper::mock::MockTransport;
    use std::sync::Arc;

    const PAGE: &str = r#"<html><head><title>Acme</title>
        <meta name="description" content="Rockets and anvils"></head>
        <body><a href="/shop">Shop</a><a href="https://other.test/">Other</a></body></html>"#;

    #[tokio::test]
    async fn extracts_title_and_description() {
        let mock = Arc::new(MockTransport::new().with_page("https://acme.test/", 200, PAGE));
        let analyzer = WebAnalyzer::new(unthrottled(&mock));
        let result = analyzer.analyze(&Competitor::new("Acme", "https://acme.test/")).await;

        assert!(result.is_success());
        let Some(Findings::Web(web)) = result.findings() else {
            panic!("expected web findings");
        };
        assert_eq!(web.title.as_deref(), Some("Acme"));
        assert_eq!(web.description.as_deref(), Some("Rockets and anvils"));
        assert_eq!(web.internal_links, 1);
        assert_eq!(web.external_links, 1);
        assert!(!web.has_structured_data);
    }

    #[tokio::test]
    async fn timeout_becomes_failure_result() {
        let mock = Arc::new(MockTransport::new().with_timeout("https://acme.test/"));
        let analyzer = WebAnalyzer::new(unthrottled(&mock));
        let result = analyzer.analyze(&Competitor::new("Acme", "https://acme.test/")).await;

        assert!(!result.is_success());
        assert_eq!(result.kind(), AnalyzerKind::Web);
        assert!(result.error().unwrap().contains("timed out"));
        assert!(result.findings().is_none());
    }

    #[tokio::test]
    async fn http_error_becomes_failure_result() {
        let mock = Arc::new(MockTransport::new().with_page("https://acme.test/", 500, "oops"));
        let analyzer = WebAnalyzer::new(unthrottled(&mock));
        let result = analyzer.analyze(&Competitor::new("Acme", "https://acme.test/")).await;
        assert!(result.error().unwrap().contains("HTTP 500"));
    }

    #[tokio::test]
    async fn invalid_homepage_is_failure_without_fetch() {
        let mock = Arc::new(MockTransport::new());
        let analyzer = WebAnalyzer::new(unthrottled(&mock));
        let result = analyzer.analyze(&Competitor::new("Acme", "not a url")).await;
        assert!(!result.is_success());
        assert_eq!(mock.call_count(), 0);
    }
}
