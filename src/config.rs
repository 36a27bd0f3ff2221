use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_NEWS_FEED_URL: &str =
    "https://news.google.com/rss/search?q={query}&hl=en-US&gl=US&ceid=US:en";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_path: String,
    pub default_output_dir: String,
    /// Minimum delay between two requests issued by the same analyzer.
    pub rate_limit_delay_ms: u64,
    pub request_timeout_seconds: u64,
    /// Deadline for a whole `analyze` run; 0 disables it.
    pub overall_timeout_seconds: u64,
    pub user_agent: String,
    pub news_max_items: usize,
    /// Feed URL template, `{query}` is replaced by the encoded competitor name.
    pub news_feed_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: "data.db".into(),
            default_output_dir: "./output".into(),
            rate_limit_delay_ms: 1000,
            request_timeout_seconds: 30,
            overall_timeout_seconds: 120,
            user_agent: "CompetitiveAnalysis/0.1 (Research Tool)".into(),
            news_max_items: 20,
            news_feed_url: DEFAULT_NEWS_FEED_URL.into(),
        }
    }
}

impl AppConfig {
    pub fn rate_limit_delay(&self) -> Duration {
        Duration::from_millis(self.rate_limit_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn overall_timeout(&self) -> Option<Duration> {
        (self.overall_timeout_seconds > 0).then(|| Duration::from_secs(self.overall_timeout_seconds))
    }
}

/// Reads the JSON config at `path`; a missing file yields the defaults.
pub fn load_config(path: &str) -> Result<AppConfig, Box<dyn std::error::Error>> {
    if !Path::new(path).exists() {
        return Ok(AppConfig::default());
    }
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}
