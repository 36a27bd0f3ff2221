use crate::analyzer::Analyzer;
use crate::model::{
    AnalysisResult, AnalyzerError, AnalyzerKind, Competitor, Findings, SocialFindings, SocialPlatform,
};
use crate::parser::parse_profile;
use crate::scraper::Fetcher;

use tracing::{info, warn};

/// A configured handle resolved to its public profile page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileTarget {
    pub platform: SocialPlatform,
    pub handle: String,
    pub url: String,
}

/// Resolves the competitor's configured handles; empty when none are set.
pub fn profile_targets(competitor: &Competitor) -> Vec<ProfileTarget> {
    let mut targets = Vec::new();
    if let Some(handle) = competitor.twitter.as_deref().map(|h| h.trim().trim_start_matches('@')) {
        if !handle.is_empty() {
            targets.push(ProfileTarget {
                platform: SocialPlatform::Twitter,
                handle: format!("@{}", handle),
                url: format!("https://x.com/{}", handle),
            });
        }
    }
    if let Some(handle) = competitor.linkedin.as_deref().map(str::trim) {
        if !handle.is_empty() {
            let url = if handle.starts_with("http://") || handle.starts_with("https://") {
                handle.to_string()
            } else {
                format!("https://www.linkedin.com/company/{}", handle)
            };
            targets.push(ProfileTarget {
                platform: SocialPlatform::Linkedin,
                handle: handle.to_string(),
                url,
            });
        }
    }
    targets
}

/// Public profile signals for the competitor's social handles.
pub struct SocialAnalyzer {
    fetcher: Fetcher,
}

impl SocialAnalyzer {
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }

    async fn run(&self, competitor: &Competitor) -> Result<Findings, AnalyzerError> {
        let targets = profile_targets(competitor);
        if targets.is_empty() {
            info!("No social handles configured for {}", competitor.name);
            return Ok(Findings::Social(SocialFindings::not_configured()));
        }

        let mut profiles = Vec::with_capacity(targets.len());
        for target in targets {
            let html = self.fetcher.fetch(&target.url).await?;
            profiles.push(parse_profile(&html, target.platform, &target.handle, &target.url)?);
        }

        Ok(Findings::Social(SocialFindings {
            configured: true,
            profiles,
        }))
    }
}

#[async_trait::async_trait]
impl Analyzer for SocialAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Social
    }

    async fn analyze(&self, competitor: &Competitor) -> AnalysisResult {
        info!("👥 Social analysis for {}", competitor.name);
        let result = AnalysisResult::from_outcome(self.kind(), &competitor.name, self.run(competitor).await);
        if let Some(err) = result.error() {
            warn!("Social analysis for {} failed: {}", competitor.name, err);
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

    #[test]
    fn resolves_profile_urls() {
        let competitor = Competitor::new("Acme", "https://acme.test/")
            .with_twitter("@acme")
            .with_linkedin("acme-corp");
        let targets = profile_targets(&competitor);
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].url, "https://x.com/acme");
        assert_eq!(targets[0].handle, "@acme");
        assert_eq!(targets[1].url, "https://www.linkedin.com/company/acme-corp");

        let competitor = Competitor::new("Acme", "https://acme.test/")
            .with_linkedin("https://www.linkedin.com/company/acme");
        assert_eq!(
            profile_targets(&competitor)[0].url,
            "https://www.linkedin.com/company/acme"
        );
    }

    #[tokio::test]
    async fn no_handle_is_not_configured_without_fetching() {
        let mock = Arc::new(MockTransport::new());
        let analyzer = SocialAnalyzer::new(unthrottled(&mock));
        let result = analyzer.analyze(&Competitor::new("Acme", "https://acme.test/")).await;

        assert!(result.is_success());
        let Some(Findings::Social(social)) = result.findings() else {
            panic!("expected social findings");
        };
        assert!(social.is_not_configured());
        assert!(social.profiles.is_empty());
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn configured_handle_is_fetched_and_parsed() {
        let page = r#"<html><head><title>Acme (@acme) / X</title>
            <meta name="description" content="Anvils for all. 4,200 Followers"></head><body></body></html>"#;
        let mock = Arc::new(MockTransport::new().with_page("https://x.com/acme", 200, page));
        let analyzer = SocialAnalyzer::new(unthrottled(&mock));
        let competitor = Competitor::new("Acme", "https://acme.test/").with_twitter("acme");
        let result = analyzer.analyze(&competitor).await;

        let Some(Findings::Social(social)) = result.findings() else {
            panic!("expected social findings");
        };
        assert!(social.configured);
        assert_eq!(social.profiles.len(), 1);
        assert_eq!(social.profiles[0].followers, Some(4_200));
        assert_eq!(social.profiles[0].display_name.as_deref(), Some("Acme"));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn profile_timeout_is_failure() {
        let mock = Arc::new(MockTransport::new().with_timeout("https://x.com/acme"));
        let analyzer = SocialAnalyzer::new(unthrottled(&mock));
        let competitor = Competitor::new("Acme", "https://acme.test/").with_twitter("acme");
        let result = analyzer.analyze(&competitor).await;

        assert!(!result.is_success());
        assert!(result.error().unwrap().contains("timed out"));
    }
}
