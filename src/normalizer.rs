use crate::model::{Competitor, ConfigurationError};
use url::Url;

/// Cleans up a competitor record before it goes into the registry.
pub fn normalize_competitor(mut competitor: Competitor) -> Result<Competitor, ConfigurationError> {
    competitor.name = competitor.name.trim().to_string();
    if competitor.name.is_empty() {
        return Err(ConfigurationError::EmptyName);
    }
    competitor.url = normalize_homepage(&competitor.url)?;
    competitor.twitter = competitor.twitter.as_deref().and_then(normalize_twitter_handle);
    competitor.linkedin = competitor
        .linkedin
        .as_deref()
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_string);
    Ok(competitor)
}

/// Adds a scheme when missing and requires an absolute http(s) URL.
pub fn normalize_homepage(raw: &str) -> Result<String, ConfigurationError> {
    let trimmed = raw.trim();
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let invalid = |reason: String| ConfigurationError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(&candidate).map_err(|e| invalid(e.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host".into()));
    }
    Ok(url.to_string())
}

fn normalize_twitter_handle(raw: &str) -> Option<String> {
    let handle = raw.trim().trim_start_matches('@').trim();
    if handle.is_empty() {
        None
    } else {
        Some(handle.to_string())
    }
}
