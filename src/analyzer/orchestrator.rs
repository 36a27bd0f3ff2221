use crate::analyzer::{Analyzer, build_analyzer};
use crate::config::AppConfig;
use crate::model::{AnalysisReport, AnalysisRequest, AnalysisResult, AnalyzerKind, Competitor};
use crate::scraper::HttpTransport;

use futures::future::join_all;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, timeout_at};
use tracing::{info, warn};

/// Runs the requested analyzers for one competitor and collects exactly one
/// result per requested kind, whatever happens to the individual runs.
pub struct Orchestrator {
    analyzers: BTreeMap<AnalyzerKind, Box<dyn Analyzer>>,
    overall_timeout: Option<Duration>,
}

impl Orchestrator {
    pub fn new(analyzers: Vec<Box<dyn Analyzer>>) -> Self {
        Self {
            analyzers: analyzers.into_iter().map(|a| (a.kind(), a)).collect(),
            overall_timeout: None,
        }
    }

    /// One analyzer per kind, each with its own rate limiter.
    pub fn from_config(transport: Arc<dyn HttpTransport>, config: &AppConfig) -> Self {
        let analyzers = AnalyzerKind::ALL
            .into_iter()
            .map(|kind| build_analyzer(kind, transport.clone(), config))
            .collect();
        Self::new(analyzers).with_overall_timeout(config.overall_timeout())
    }

    pub fn with_overall_timeout(mut self, overall_timeout: Option<Duration>) -> Self {
        self.overall_timeout = overall_timeout;
        self
    }

    /// Runs `request` against `competitor`. A request naming a different
    /// competitor is not run; every requested kind is recorded as a failure.
    pub async fn run(&self, request: &AnalysisRequest, competitor: &Competitor) -> AnalysisReport {
        if request.competitor != competitor.name {
            warn!(
                "Request for {} does not match competitor {}; skipping",
                request.competitor, competitor.name
            );
            let mut report = AnalysisReport::new(competitor.name.clone());
            for &kind in &request.kinds {
                report.insert(AnalysisResult::failure(
                    kind,
                    &competitor.name,
                    format!("request is for '{}', not '{}'", request.competitor, competitor.name),
                ));
            }
            return report;
        }
        self.analyze(competitor, &request.kinds).await
    }

    /// Runs the analyzers concurrently. Analyzers still running when the
    /// overall deadline passes are dropped and recorded as failures.
    pub async fn analyze(&self, competitor: &Competitor, kinds: &BTreeSet<AnalyzerKind>) -> AnalysisReport {
        info!(
            "🚀 Analyzing {} with [{}]",
            competitor.name,
            kinds.iter().map(AnalyzerKind::as_str).collect::<Vec<_>>().join(", ")
        );
        let deadline = self.overall_timeout.map(|t| Instant::now() + t);

        let runs = kinds.iter().map(|&kind| {
            let analyzer = self.analyzers.get(&kind);
            async move {
                let Some(analyzer) = analyzer else {
                    return AnalysisResult::failure(kind, &competitor.name, "no analyzer registered");
                };
                match deadline {
                    Some(deadline) => match timeout_at(deadline, analyzer.analyze(competitor)).await {
                        Ok(result) => result,
                        Err(_) => {
                            warn!("{} analysis for {} cancelled by overall timeout", kind, competitor.name);
                            AnalysisResult::failure(kind, &competitor.name, "cancelled: overall timeout")
                        }
                    },
                    None => analyzer.analyze(competitor).await,
                }
            }
        });

        let mut report = AnalysisReport::new(competitor.name.clone());
        for result in join_all(runs).await {
            report.insert(result);
        }

        info!(
            "Finished {}: {} ok, {} failed",
            competitor.name,
            report.results.len() - report.failed_kinds().len(),
            report.failed_kinds().len()
        );
        report
    }
}
