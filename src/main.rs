mod analyzer;
mod config;
mod exporter;
mod model;
mod normalizer;
mod parser;
mod scraper;
mod storage;
mod utils;

use analyzer::Orchestrator;
use analyzer::social::profile_targets;
use clap::{Parser, Subcommand, ValueEnum};
use config::{AppConfig, load_config};
use exporter::{export_csv, export_json, read_json};
use model::{AnalysisReport, AnalysisRequest, AnalysisStatus, AnalyzerKind, Competitor, Findings};
use normalizer::normalize_competitor;
use scraper::ReqwestTransport;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use storage::SqliteStorage;
use tracing::{error, info};
use utils::truncate_chars;

#[derive(Parser)]
#[command(name = "compete")]
#[command(version, about = "Competitive analysis - gather public signals about your competitors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, default_value = "config.json", help = "Path to the JSON config file")]
    config: String,

    #[arg(long, help = "Enable debug logging")]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Add (or update) a competitor to track
    Add {
        name: String,
        #[arg(long, short, help = "Competitor website URL")]
        url: String,
        #[arg(long, short, help = "Twitter/X handle")]
        twitter: Option<String>,
        #[arg(long, short, help = "LinkedIn handle or profile URL")]
        linkedin: Option<String>,
    },

    /// List all tracked competitors
    List,

    /// Remove a competitor and its stored results
    Remove { name: String },

    /// Run analysis on a competitor
    Analyze {
        name: String,
        #[arg(long = "type", short = 't', help = "Analysis type: web, seo, news, social (repeatable)")]
        types: Vec<String>,
        #[arg(long, short, help = "Run all analysis types")]
        all: bool,
        #[arg(long, short, help = "Output file path")]
        output: Option<PathBuf>,
        #[arg(long, short, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Export the latest stored results of a competitor
    Export {
        name: String,
        #[arg(long, short, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        #[arg(long, short, help = "Output file path")]
        output: Option<PathBuf>,
    },

    /// Print a report previously exported as JSON
    Show { path: PathBuf },

    /// Show stored analysis history
    History {
        name: String,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

impl OutputFormat {
    fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for results
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("😱 Panic occurred: {:?}", panic_info);
    }));

    let config = match load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let storage = match SqliteStorage::new(&config.database_path) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to initialize storage: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(cli.command, &config, &storage).await {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(
    command: Commands,
    config: &AppConfig,
    storage: &SqliteStorage,
) -> Result<ExitCode, Box<dyn Error>> {
    match command {
        Commands::Add {
            name,
            url,
            twitter,
            linkedin,
        } => {
            let mut competitor = Competitor::new(name, url);
            if let Some(handle) = twitter {
                competitor = competitor.with_twitter(handle);
            }
            if let Some(handle) = linkedin {
                competitor = competitor.with_linkedin(handle);
            }
            let competitor = normalize_competitor(competitor)?;
            storage.add_competitor(&competitor)?;

            println!("Added competitor: {}", competitor.name);
            println!("  URL: {}", competitor.url);
            for target in profile_targets(&competitor) {
                println!("  {}: {}", target.platform, target.handle);
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::List => {
            let competitors = storage.list_competitors()?;
            if competitors.is_empty() {
                println!("No competitors tracked yet.");
                println!("Use 'compete add <name> --url <url>' to add one.");
                return Ok(ExitCode::SUCCESS);
            }
            println!("{:<20} {:<40} {:<16} {}", "NAME", "URL", "TWITTER", "LINKEDIN");
            for c in competitors {
                println!(
                    "{:<20} {:<40} {:<16} {}",
                    c.name,
                    c.url,
                    c.twitter.as_deref().unwrap_or("-"),
                    c.linkedin.as_deref().unwrap_or("-")
                );
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Remove { name } => {
            if storage.remove_competitor(&name)? {
                println!("Removed competitor: {}", name);
                Ok(ExitCode::SUCCESS)
            } else {
                println!("Competitor not found: {}", name);
                Ok(ExitCode::FAILURE)
            }
        }

        Commands::Analyze {
            name,
            types,
            all,
            output,
            format,
        } => {
            let Some(competitor) = storage.get_competitor(&name)? else {
                println!("Competitor not found: {}", name);
                println!("Use 'compete list' to see tracked competitors.");
                return Ok(ExitCode::FAILURE);
            };

            let tags = if all { vec!["all".to_string()] } else { types };
            let request = AnalysisRequest::from_tags(competitor.name.clone(), &tags)?;

            let transport = Arc::new(ReqwestTransport::new()?);
            let orchestrator = Orchestrator::from_config(transport, config);
            let report = orchestrator.run(&request, &competitor).await;

            print_report(&report);
            storage.save_report(&report)?;

            if let Some(path) = output {
                write_export(&report, &path, format)?;
                println!("\nResults exported to: {}", path.display());
            }

            if report.all_succeeded() {
                Ok(ExitCode::SUCCESS)
            } else {
                info!("{} analysis type(s) failed", report.failed_kinds().len());
                Ok(ExitCode::FAILURE)
            }
        }

        Commands::Export {
            name,
            format,
            output,
        } => {
            let Some(report) = storage.latest_results(&name)? else {
                println!("No stored results for {}; run 'compete analyze {} --all' first.", name, name);
                return Ok(ExitCode::FAILURE);
            };
            let path = output.unwrap_or_else(|| {
                Path::new(&config.default_output_dir)
                    .join(format!("{}_analysis.{}", name, format.extension()))
            });
            write_export(&report, &path, format)?;
            println!("Exported to: {}", path.display());
            Ok(ExitCode::SUCCESS)
        }

        Commands::Show { path } => {
            let report = read_json(&path)?;
            print_report(&report);
            Ok(ExitCode::SUCCESS)
        }

        Commands::History { name, limit } => {
            let results = storage.history(&name, limit)?;
            if results.is_empty() {
                println!("No stored results for {}.", name);
                return Ok(ExitCode::SUCCESS);
            }
            for result in results {
                let status = match result.status() {
                    AnalysisStatus::Success(_) => "success".to_string(),
                    AnalysisStatus::Failure(e) => format!("failure: {}", e),
                };
                println!(
                    "{}  {:<7} {}",
                    result.analyzed_at().format("%Y-%m-%d %H:%M:%S"),
                    result.kind(),
                    status
                );
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn write_export(report: &AnalysisReport, path: &Path, format: OutputFormat) -> Result<(), Box<dyn Error>> {
    match format {
        OutputFormat::Json => export_json(report, path)?,
        OutputFormat::Csv => export_csv(report, path)?,
    }
    Ok(())
}

/// Prints a human readable summary of the report.
fn print_report(report: &AnalysisReport) {
    println!("\nAnalysis Results for {}", report.competitor);
    println!("Analyzed at: {}\n", report.analyzed_at.format("%Y-%m-%d %H:%M:%S"));

    for kind in AnalyzerKind::ALL {
        let Some(result) = report.get(kind) else {
            continue;
        };
        println!("{} Analysis", kind.label());
        let Some(findings) = result.findings() else {
            println!("  failed: {}\n", result.error().unwrap_or_default());
            continue;
        };

        match findings {
            Findings::Web(web) => {
                if let Some(title) = &web.title {
                    println!("  Title: {}", title);
                }
                if let Some(description) = &web.description {
                    println!("  Description: {}", truncate_chars(description, 100));
                }
                println!("  Links: {} internal, {} external", web.internal_links, web.external_links);
                println!("  Images: {}", web.images_count);
                println!("  Structured data: {}", if web.has_structured_data { "yes" } else { "no" });
                println!("  Page size: {} bytes", web.page_size_bytes);
                println!("  Load time: {}ms", web.load_time_ms);
                if !web.technologies.is_empty() {
                    println!("  Technologies: {}", web.technologies.join(", "));
                }
            }
            Findings::Seo(seo) => {
                if let Some(title) = &seo.meta_title {
                    println!("  Title: {} ({} chars)", title, seo.title_length.unwrap_or_default());
                }
                if let Some(len) = seo.meta_description_length {
                    println!("  Meta description: {} chars", len);
                }
                let counts: Vec<String> = (1..=6)
                    .map(|level| format!("h{}={}", level, seo.headings.count(level)))
                    .collect();
                println!(
                    "  Headings: {}{}",
                    counts.join(" "),
                    if seo.headings.skips_levels { " (skips levels)" } else { "" }
                );
                if let Some(canonical) = &seo.canonical_url {
                    println!("  Canonical: {}", canonical);
                }
                println!("  robots.txt: {}", if seo.has_robots_txt { "found" } else { "not detected" });
                println!("  sitemap.xml: {}", if seo.has_sitemap { "found" } else { "not detected" });
                if !seo.og_tags.is_empty() {
                    println!("  OG tags: {} found", seo.og_tags.len());
                }
            }
            Findings::News(news) => {
                println!("  Total mentions found: {}", news.total_mentions);
                for mention in news.mentions.iter().take(5) {
                    println!("  - {}", truncate_chars(&mention.title, 80));
                    if let Some(source) = &mention.source {
                        println!("    Source: {}", source);
                    }
                }
            }
            Findings::Social(social) if social.is_not_configured() => {
                println!("  not configured (no social handles)");
            }
            Findings::Social(social) => {
                for profile in &social.profiles {
                    println!("  {}: {}", profile.platform, profile.handle);
                    if let Some(followers) = profile.followers {
                        println!("    Followers: {}", followers);
                    }
                    if let Some(bio) = &profile.bio {
                        println!("    Bio: {}", truncate_chars(bio, 80));
                    }
                }
            }
        }
        println!();
    }

    let failed: Vec<&str> = report.failed_kinds().iter().map(AnalyzerKind::as_str).collect();
    if !failed.is_empty() {
        println!("Failed: {}", failed.join(", "));
    }
}
