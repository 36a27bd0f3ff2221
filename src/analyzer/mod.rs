// Analyzer module: the shared contract plus one submodule per data source.

pub mod news;
pub mod orchestrator;
pub mod seo;
pub mod social;
pub mod web;

use crate::config::AppConfig;
use crate::model::{AnalysisResult, AnalyzerKind, Competitor, ParseError};
use crate::scraper::{Fetcher, HttpTransport};

use std::sync::Arc;
use url::Url;

pub use news::NewsAnalyzer;
pub use orchestrator::Orchestrator;
pub use seo::SeoAnalyzer;
pub use social::SocialAnalyzer;
pub use web::WebAnalyzer;

/// The capability every analyzer variant implements.
///
/// `analyze` never fails: fetch and parse problems are recorded as a
/// failure-status [`AnalysisResult`].
#[async_trait::async_trait]
pub trait Analyzer: Send + Sync {
    fn kind(&self) -> AnalyzerKind;

    async fn analyze(&self, competitor: &Competitor) -> AnalysisResult;
}

/// Builds the analyzer for `kind` with its own fetcher and rate limiter.
pub fn build_analyzer(
    kind: AnalyzerKind,
    transport: Arc<dyn HttpTransport>,
    config: &AppConfig,
) -> Box<dyn Analyzer> {
    let fetcher = Fetcher::from_config(transport, config);
    match kind {
        AnalyzerKind::Web => Box::new(WebAnalyzer::new(fetcher)),
        AnalyzerKind::Seo => Box::new(SeoAnalyzer::new(fetcher)),
        AnalyzerKind::News => Box::new(NewsAnalyzer::new(
            fetcher,
            config.news_feed_url.clone(),
            config.news_max_items,
        )),
        AnalyzerKind::Social => Box::new(SocialAnalyzer::new(fetcher)),
    }
}

pub(crate) fn homepage_url(competitor: &Competitor) -> Result<Url, ParseError> {
    Url::parse(&competitor.url).map_err(|e| ParseError::Url {
        url: competitor.url.clone(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::scraper::Fetcher;
    use crate::scraper::mock::MockTransport;
    use std::sync::Arc;
    use std::time::Duration;

    pub fn unthrottled(mock: &Arc<MockTransport>) -> Fetcher {
        Fetcher::new(mock.clone(), Duration::ZERO, "test-agent", Duration::from_secs(5))
    }
}
