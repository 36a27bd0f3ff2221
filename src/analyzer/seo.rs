use crate::analyzer::{Analyzer, homepage_url};
use crate::model::{AnalysisResult, AnalyzerError, AnalyzerKind, Competitor, Findings};
use crate::parser::extract_seo_findings;
use crate::scraper::Fetcher;

use tracing::{debug, info, warn};
use url::Url;

const ROBOTS_PATH: &str = "/robots.txt";
const SITEMAP_PATH: &str = "/sitemap.xml";

/// On-page SEO signals plus robots.txt / sitemap.xml presence.
pub struct SeoAnalyzer {
    fetcher: Fetcher,
}

impl SeoAnalyzer {
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }

    async fn run(&self, competitor: &Competitor) -> Result<Findings, AnalyzerError> {
        let page_url = homepage_url(competitor)?;
        let html = self.fetcher.fetch(page_url.as_str()).await?;
        let mut findings = extract_seo_findings(&html)?;

        findings.has_robots_txt = self.probe(&page_url, ROBOTS_PATH).await.is_some();
        findings.has_sitemap = self
            .probe(&page_url, SITEMAP_PATH)
            .await
            .is_some_and(|body| looks_like_sitemap(&body));

        Ok(Findings::Seo(findings))
    }

    /// A failed probe only means the file was not detected.
    async fn probe(&self, base: &Url, path: &str) -> Option<String> {
        let url = base.join(path).ok()?;
        match self.fetcher.fetch(url.as_str()).await {
            Ok(body) => Some(body),
            Err(e) => {
                debug!("Probe {} not detected: {}", url, e);
                None
            }
        }
    }
}

// Some servers answer unknown paths with a 200 HTML page.
fn looks_like_sitemap(body: &str) -> bool {
    body.contains("<urlset") || body.contains("<sitemapindex")
}

#[async_trait::async_trait]
impl Analyzer for SeoAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Seo
    }

    async fn analyze(&self, competitor: &Competitor) -> AnalysisResult {
        info!("🔎 SEO analysis for {}", competitor.name);
        let result = AnalysisResult::from_outcome(self.kind(), &competitor.name, self.run(competitor).await);
        if let Some(err) = result.error() {
            warn!("SEO analysis for {} failed: {}", competitor.name, err);
        }
        result
    }
}
