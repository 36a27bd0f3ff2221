// JSON / CSV export of analysis reports
use crate::model::{AnalysisReport, ExportError};

use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::info;

pub fn export_json(report: &AnalysisReport, path: &Path) -> Result<(), ExportError> {
    ensure_parent(path)?;
    fs::write(path, serde_json::to_string_pretty(report)?)?;
    info!("Exported JSON to {}", path.display());
    Ok(())
}

/// Reads back a report written by [`export_json`].
pub fn read_json(path: &Path) -> Result<AnalysisReport, ExportError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn export_csv(report: &AnalysisReport, path: &Path) -> Result<(), ExportError> {
    ensure_parent(path)?;
    let mut out = String::new();
    for row in csv_rows(report) {
        let line: Vec<String> = row.iter().map(|f| csv_field(f)).collect();
        out.push_str(&line.join(","));
        out.push_str("\r\n");
    }
    fs::write(path, out)?;
    info!("Exported CSV to {}", path.display());
    Ok(())
}

/// Flattens a report into `Section, Field, Value` rows.
pub fn csv_rows(report: &AnalysisReport) -> Vec<[String; 3]> {
    let mut rows = vec![
        row("Section", "Field", "Value".to_string()),
        row("Meta", "Competitor", report.competitor.clone()),
        row("Meta", "Analyzed At", report.analyzed_at.to_rfc3339()),
    ];

    for result in report.results.values() {
        let section = result.kind().label();
        match (result.findings(), result.error()) {
            (Some(findings), _) => {
                rows.push(row(section, "Status", "success".to_string()));
                for (field, value) in findings.field_map() {
                    rows.push(row(section, &field, value_text(&value)));
                }
            }
            (None, error) => {
                rows.push(row(section, "Status", "failure".to_string()));
                rows.push(row(section, "Error", error.unwrap_or_default().to_string()));
            }
        }
    }
    rows
}

fn row(section: &str, field: &str, value: String) -> [String; 3] {
    [section.to_string(), field.to_string(), value]
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn ensure_parent(path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AnalysisResult, AnalyzerKind, Findings, NewsFindings, NewsMention, SeoFindings, WebFindings,
    };
    use chrono::{TimeZone, Utc};

    fn sample_report() -> AnalysisReport {
        let mut report = AnalysisReport::new("Acme");
        let web = WebFindings {
            title: Some("Acme, \"the\" rocket company".into()),
            internal_links: 12,
            external_links: 3,
            has_structured_data: true,
            technologies: vec!["React".into()],
            ..Default::default()
        };
        report.insert(AnalysisResult::success("Acme", Findings::Web(web)));
        let news = NewsFindings {
            mentions: vec![NewsMention {
                title: "Acme opens factory - Planet".into(),
                link: "https://news.test/1".into(),
                source: Some("Planet".into()),
                published_at: Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()),
                snippet: None,
            }],
            total_mentions: 1,
        };
        report.insert(AnalysisResult::success("Acme", Findings::News(news)));
        report.insert(AnalysisResult::failure(AnalyzerKind::Seo, "Acme", "request timed out"));
        report
    }

    #[test]
    fn json_round_trip_keeps_field_maps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("acme.json");
        let report = sample_report();

        export_json(&report, &path).unwrap();
        let restored = read_json(&path).unwrap();

        assert_eq!(restored, report);
        for (kind, result) in &report.results {
            let restored_result = restored.get(*kind).unwrap();
            assert_eq!(
                restored_result.findings().map(Findings::field_map),
                result.findings().map(Findings::field_map)
            );
            assert_eq!(restored_result.error(), result.error());
        }
    }

    #[test]
    fn csv_rows_cover_success_and_failure() {
        let rows = csv_rows(&sample_report());
        assert_eq!(rows[0], ["Section", "Field", "Value"].map(String::from));
        assert!(rows.contains(&["Web", "internal_links", "12"].map(String::from)));
        assert!(rows.contains(&["Web", "technologies", r#"["React"]"#].map(String::from)));
        assert!(rows.contains(&["SEO", "Status", "failure"].map(String::from)));
        assert!(rows.contains(&["SEO", "Error", "request timed out"].map(String::from)));
        assert!(!rows.iter().any(|r| r[0] == "Web" && r[1] == "description"));
    }

    #[test]
    fn csv_file_quotes_special_characters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("acme.csv");
        export_csv(&sample_report(), &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Section,Field,Value\r\n"));
        assert!(content.contains(r#"Web,title,"Acme, ""the"" rocket company""#));
    }

    #[test]
    fn seo_headings_are_json_encoded_in_csv() {
        let mut report = AnalysisReport::new("Acme");
        report.insert(AnalysisResult::success("Acme", Findings::Seo(SeoFindings::default())));
        let rows = csv_rows(&report);
        let headings = rows.iter().find(|r| r[1] == "headings").unwrap();
        let parsed: Value = serde_json::from_str(&headings[2]).unwrap();
        assert_eq!(parsed["h1"], 0);
    }
}
