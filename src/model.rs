// Core structs: Competitor, AnalysisResult, per-analyzer findings and errors
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competitor {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Competitor {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            twitter: None,
            linkedin: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_twitter(mut self, handle: impl Into<String>) -> Self {
        self.twitter = Some(handle.into());
        self
    }

    pub fn with_linkedin(mut self, handle: impl Into<String>) -> Self {
        self.linkedin = Some(handle.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerKind {
    Web,
    Seo,
    News,
    Social,
}

impl AnalyzerKind {
    pub const ALL: [AnalyzerKind; 4] = [
        AnalyzerKind::Web,
        AnalyzerKind::Seo,
        AnalyzerKind::News,
        AnalyzerKind::Social,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyzerKind::Web => "web",
            AnalyzerKind::Seo => "seo",
            AnalyzerKind::News => "news",
            AnalyzerKind::Social => "social",
        }
    }

    /// Human readable section name used in summaries and CSV exports.
    pub fn label(&self) -> &'static str {
        match self {
            AnalyzerKind::Web => "Web",
            AnalyzerKind::Seo => "SEO",
            AnalyzerKind::News => "News",
            AnalyzerKind::Social => "Social",
        }
    }
}

impl fmt::Display for AnalyzerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalyzerKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "web" => Ok(AnalyzerKind::Web),
            "seo" => Ok(AnalyzerKind::Seo),
            "news" => Ok(AnalyzerKind::News),
            "social" => Ok(AnalyzerKind::Social),
            other => Err(ConfigurationError::UnknownAnalyzer(other.to_string())),
        }
    }
}

/// Which analyzers to run for which competitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub competitor: String,
    pub kinds: BTreeSet<AnalyzerKind>,
}

impl AnalysisRequest {
    pub fn new(competitor: impl Into<String>, kinds: impl IntoIterator<Item = AnalyzerKind>) -> Self {
        Self {
            competitor: competitor.into(),
            kinds: kinds.into_iter().collect(),
        }
    }

    /// Builds a request from type tags; `all` expands to every analyzer.
    pub fn from_tags<S: AsRef<str>>(competitor: impl Into<String>, tags: &[S]) -> Result<Self, ConfigurationError> {
        let mut kinds = BTreeSet::new();
        for tag in tags {
            let tag = tag.as_ref();
            if tag.trim().eq_ignore_ascii_case("all") {
                kinds.extend(AnalyzerKind::ALL);
            } else {
                kinds.insert(tag.parse()?);
            }
        }
        if kinds.is_empty() {
            return Err(ConfigurationError::NoAnalyzersSelected);
        }
        Ok(Self::new(competitor, kinds))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebFindings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub internal_links: usize,
    pub external_links: usize,
    pub has_structured_data: bool,
    pub headings: Vec<String>,
    pub images_count: usize,
    pub technologies: Vec<String>,
    pub page_size_bytes: usize,
    pub load_time_ms: u64,
}

/// Heading tag counts plus the order in which levels appear in the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadingSummary {
    pub h1: usize,
    pub h2: usize,
    pub h3: usize,
    pub h4: usize,
    pub h5: usize,
    pub h6: usize,
    pub order: Vec<u8>,
    /// True when a heading jumps more than one level deeper than its predecessor (h1 -> h3).
    pub skips_levels: bool,
}

impl HeadingSummary {
    pub fn count(&self, level: u8) -> usize {
        match level {
            1 => self.h1,
            2 => self.h2,
            3 => self.h3,
            4 => self.h4,
            5 => self.h5,
            6 => self.h6,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeoFindings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description_length: Option<usize>,
    pub headings: HeadingSummary,
    pub has_robots_txt: bool,
    pub has_sitemap: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub meta_keywords: Vec<String>,
    #[serde(default)]
    pub h1_tags: Vec<String>,
    #[serde(default)]
    pub h2_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub robots_meta: Option<String>,
    #[serde(default)]
    pub og_tags: BTreeMap<String, String>,
    #[serde(default)]
    pub structured_data: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsMention {
    pub title: String,
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsFindings {
    pub mentions: Vec<NewsMention>,
    /// Number of entries in the feed before the mention cap was applied.
    pub total_mentions: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialPlatform {
    Twitter,
    Linkedin,
}

impl fmt::Display for SocialPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocialPlatform::Twitter => f.write_str("twitter"),
            SocialPlatform::Linkedin => f.write_str("linkedin"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialProfile {
    pub platform: SocialPlatform,
    pub handle: String,
    pub profile_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followers: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub following: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posts: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialFindings {
    /// False when the competitor has no handles; no profile was fetched in that case.
    pub configured: bool,
    pub profiles: Vec<SocialProfile>,
}

impl SocialFindings {
    pub fn not_configured() -> Self {
        Self {
            configured: false,
            profiles: Vec::new(),
        }
    }

    pub fn is_not_configured(&self) -> bool {
        !self.configured
    }
}

/// Typed payload of a successful analysis, one shape per analyzer kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Findings {
    Web(WebFindings),
    Seo(SeoFindings),
    News(NewsFindings),
    Social(SocialFindings),
}

impl Findings {
    pub fn kind(&self) -> AnalyzerKind {
        match self {
            Findings::Web(_) => AnalyzerKind::Web,
            Findings::Seo(_) => AnalyzerKind::Seo,
            Findings::News(_) => AnalyzerKind::News,
            Findings::Social(_) => AnalyzerKind::Social,
        }
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        match self {
            Findings::Web(f) => serde_json::to_value(f),
            Findings::Seo(f) => serde_json::to_value(f),
            Findings::News(f) => serde_json::to_value(f),
            Findings::Social(f) => serde_json::to_value(f),
        }
    }

    pub fn from_value(kind: AnalyzerKind, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            AnalyzerKind::Web => Findings::Web(serde_json::from_value(value)?),
            AnalyzerKind::Seo => Findings::Seo(serde_json::from_value(value)?),
            AnalyzerKind::News => Findings::News(serde_json::from_value(value)?),
            AnalyzerKind::Social => Findings::Social(serde_json::from_value(value)?),
        })
    }

    /// Flattened field-name to value view used by exporters. Signals that
    /// were not detected are absent from the map.
    pub fn field_map(&self) -> BTreeMap<String, Value> {
        match self.to_value() {
            Ok(Value::Object(map)) => map.into_iter().filter(|(_, v)| !v.is_null()).collect(),
            _ => BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisStatus {
    Success(Findings),
    Failure(String),
}

/// Outcome of one analyzer run against one competitor.
///
/// Built only through [`AnalysisResult::success`], [`AnalysisResult::failure`]
/// or [`AnalysisResult::from_outcome`], which keeps the kind tag and the
/// findings variant in agreement. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ResultRecord", into = "ResultRecord")]
pub struct AnalysisResult {
    competitor: String,
    kind: AnalyzerKind,
    analyzed_at: DateTime<Utc>,
    status: AnalysisStatus,
}

impl AnalysisResult {
    pub fn success(competitor: &str, findings: Findings) -> Self {
        Self {
            competitor: competitor.to_string(),
            kind: findings.kind(),
            analyzed_at: Utc::now(),
            status: AnalysisStatus::Success(findings),
        }
    }

    pub fn failure(kind: AnalyzerKind, competitor: &str, error: impl fmt::Display) -> Self {
        Self {
            competitor: competitor.to_string(),
            kind,
            analyzed_at: Utc::now(),
            status: AnalysisStatus::Failure(error.to_string()),
        }
    }

    /// Converts an analyzer's internal outcome into a result, turning errors
    /// into failure records.
    pub fn from_outcome(
        kind: AnalyzerKind,
        competitor: &str,
        outcome: Result<Findings, AnalyzerError>,
    ) -> Self {
        match outcome {
            Ok(findings) if findings.kind() == kind => Self::success(competitor, findings),
            Ok(findings) => Self::failure(
                kind,
                competitor,
                format!("analyzer produced {} findings", findings.kind()),
            ),
            Err(e) => Self::failure(kind, competitor, e),
        }
    }

    pub fn competitor(&self) -> &str {
        &self.competitor
    }

    pub fn kind(&self) -> AnalyzerKind {
        self.kind
    }

    pub fn analyzed_at(&self) -> DateTime<Utc> {
        self.analyzed_at
    }

    pub fn status(&self) -> &AnalysisStatus {
        &self.status
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, AnalysisStatus::Success(_))
    }

    pub fn findings(&self) -> Option<&Findings> {
        match &self.status {
            AnalysisStatus::Success(f) => Some(f),
            AnalysisStatus::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            AnalysisStatus::Success(_) => None,
            AnalysisStatus::Failure(e) => Some(e),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum StatusTag {
    Success,
    Failure,
}

/// Wire shape of [`AnalysisResult`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ResultRecord {
    competitor: String,
    analyzer: AnalyzerKind,
    analyzed_at: DateTime<Utc>,
    status: StatusTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    findings: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<AnalysisResult> for ResultRecord {
    fn from(result: AnalysisResult) -> Self {
        let (status, findings, error) = match result.status {
            AnalysisStatus::Success(f) => (StatusTag::Success, Some(f.to_value().unwrap_or_default()), None),
            AnalysisStatus::Failure(e) => (StatusTag::Failure, None, Some(e)),
        };
        Self {
            competitor: result.competitor,
            analyzer: result.kind,
            analyzed_at: result.analyzed_at,
            status,
            findings,
            error,
        }
    }
}

impl TryFrom<ResultRecord> for AnalysisResult {
    type Error = String;

    fn try_from(record: ResultRecord) -> Result<Self, Self::Error> {
        let status = match (record.status, record.findings, record.error) {
            (StatusTag::Success, Some(value), None) => {
                let findings = Findings::from_value(record.analyzer, value)
                    .map_err(|e| format!("invalid {} findings: {}", record.analyzer, e))?;
                AnalysisStatus::Success(findings)
            }
            (StatusTag::Success, _, _) => {
                return Err("success result must carry findings and no error".into());
            }
            (StatusTag::Failure, None, Some(error)) => AnalysisStatus::Failure(error),
            (StatusTag::Failure, _, _) => {
                return Err("failure result must carry an error and no findings".into());
            }
        };
        Ok(Self {
            competitor: record.competitor,
            kind: record.analyzer,
            analyzed_at: record.analyzed_at,
            status,
        })
    }
}

/// Aggregate of one orchestrated run: one result per requested analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub competitor: String,
    pub analyzed_at: DateTime<Utc>,
    pub results: BTreeMap<AnalyzerKind, AnalysisResult>,
}

impl AnalysisReport {
    pub fn new(competitor: impl Into<String>) -> Self {
        Self {
            competitor: competitor.into(),
            analyzed_at: Utc::now(),
            results: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, result: AnalysisResult) {
        self.results.insert(result.kind(), result);
    }

    pub fn get(&self, kind: AnalyzerKind) -> Option<&AnalysisResult> {
        self.results.get(&kind)
    }

    pub fn failed_kinds(&self) -> Vec<AnalyzerKind> {
        self.results
            .values()
            .filter(|r| !r.is_success())
            .map(|r| r.kind())
            .collect()
    }

    pub fn all_succeeded(&self) -> bool {
        self.results.values().all(AnalysisResult::is_success)
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },
    #[error("connection to {url} failed: {reason}")]
    Connection { url: String, reason: String },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout { .. })
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid selector '{0}'")]
    Selector(String),
    #[error("malformed feed: {0}")]
    Feed(String),
    #[error("invalid url '{url}': {reason}")]
    Url { url: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("unknown analyzer type '{0}' (expected web, seo, news, social or all)")]
    UnknownAnalyzer(String),
    #[error("no analyzer types selected")]
    NoAnalyzersSelected,
    #[error("competitor name must not be empty")]
    EmptyName,
    #[error("invalid homepage url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Everything that can go wrong inside a single analyzer run. Never leaves
/// `Analyzer::analyze`; it is recorded as a failure result instead.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("corrupt stored record: {0}")]
    Corrupt(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
