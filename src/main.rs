//! # site-audit CLI Application
//!
//! Command-line interface for auditing a website and turning the findings into a
//! page-builder prompt.
//!
//! ## Key Components
//!
//! - CLI argument parsing with clap
//! - Subcommands:
//!   - `crawl`: Crawl a site and summarize its structure and style
//!   - `performance`: Measure a URL with PageSpeed Insights
//!   - `audit`: Crawl, measure, analyze with the LLM and write report and prompt
//!
//! ## Features
//!
//! - Spinners for long-running steps
//! - Optional file logging and OTLP trace export
//! - JSON artifacts for every step

mod telemetry;

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use site_audit::crawler::{Crawler, CrawlerConfig, SiteDocument, normalize_base_url};
use site_audit::insights::{AIInsightSet, InsightConfig, gemini_extractor};
use site_audit::model::GEMINI_API_KEY_VAR;
use site_audit::pagespeed::{PageSpeedClient, PageSpeedConfig, PerformanceReport, Strategy};
use site_audit::prompt::{PromptFormat, export_prompt, synthesize};
use site_audit::report::AuditReport;
use site_audit::style::{StyleSniffer, StyleSummary};
use site_audit::{markdown, seo};
use tracing::{info, instrument, warn};

#[derive(Parser)]
#[command(author, version, about = "Audit a website and generate an AI page-builder prompt", long_about = None)]
struct Cli {
    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Crawl a website and summarize its content and style
    Crawl(CrawlArgs),

    /// Measure a URL with PageSpeed Insights
    Performance(PerformanceArgs),

    /// Run the full audit and generate the page-builder prompt
    Audit(AuditArgs),
}

#[derive(Args, Debug)]
struct CrawlOptions {
    /// Maximum number of pages to analyze
    #[arg(short = 'p', long, default_value = "10")]
    max_pages: usize,

    /// Delay between requests in milliseconds
    #[arg(short, long, default_value = "1000")]
    delay: u64,
}

impl CrawlOptions {
    fn config(&self) -> CrawlerConfig {
        CrawlerConfig::builder()
            .max_pages(self.max_pages)
            .delay_ms(self.delay)
            .build()
    }
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// URL to crawl
    #[arg(required = true)]
    url: String,

    #[command(flatten)]
    crawl: CrawlOptions,

    /// Save the crawl result to a JSON file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    Mobile,
    Desktop,
    Both,
}

#[derive(Args, Debug)]
struct PerformanceArgs {
    /// URL to measure
    #[arg(required = true)]
    url: String,

    /// Device profile to measure
    #[arg(short, long, value_enum, default_value = "both")]
    strategy: StrategyArg,

    /// Save the measurements to a JSON file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct AuditArgs {
    /// URL to audit
    #[arg(required = true)]
    url: String,

    #[command(flatten)]
    crawl: CrawlOptions,

    /// Skip PageSpeed measurements
    #[arg(long)]
    skip_performance: bool,

    /// Skip the LLM analysis and use default insights
    #[arg(long)]
    skip_ai: bool,

    /// Use the free-tier model and quota
    #[arg(long)]
    free_tier: bool,

    /// Path of the JSON report
    #[arg(short, long, default_value = "audit_report.json")]
    report: PathBuf,

    /// Path of the generated prompt
    #[arg(long, default_value = "ai_prompt.txt")]
    prompt_out: PathBuf,

    /// Format of the generated prompt
    #[arg(long, value_enum, default_value = "txt")]
    prompt_format: PromptFormat,

    /// Print the prompt to the terminal
    #[arg(long)]
    render: bool,
}

#[derive(Serialize)]
struct CrawlOutput<'a> {
    site: &'a SiteDocument,
    style: &'a StyleSummary,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _telemetry = telemetry::init_tracing_subscriber(cli.log_file.as_deref())?;

    match cli.command {
        Commands::Crawl(args) => crawl_command(args).await,
        Commands::Performance(args) => performance_command(args).await,
        Commands::Audit(args) => audit_command(args).await,
    }
}

fn spinner(message: &str) -> anyhow::Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner().template("{spinner:.cyan} [{elapsed_precise}] {msg}")?,
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(120));
    spinner.set_message(message.to_string());
    Ok(spinner)
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Saved {}", path.display());
    Ok(())
}

/// Crawl the site and sniff the home page's stylesheet
async fn crawl_site(url: &str, options: &CrawlOptions) -> anyhow::Result<(SiteDocument, StyleSummary)> {
    let base_url = normalize_base_url(url)?;
    let crawler = Crawler::new(options.config())?;

    let progress = spinner(&format!("Crawling {}...", base_url))?;
    let site = match crawler.crawl(&base_url).await {
        Ok(site) => site,
        Err(e) => {
            progress.abandon_with_message("Crawl failed");
            return Err(e.into());
        }
    };
    progress.finish_with_message(format!("Analyzed {} pages", site.pages_analyzed));

    let sniffer = StyleSniffer::new(crawler.fetcher().clone());
    let style = match site.home_page() {
        Some(home) => {
            let outcome = sniffer.sniff(home).await;
            if let Some(cause) = outcome.cause() {
                warn!("Using an empty style summary: {}", cause);
            }
            outcome.into_value()
        }
        None => StyleSummary::default(),
    };
    Ok((site, style))
}

#[instrument]
async fn crawl_command(args: CrawlArgs) -> anyhow::Result<()> {
    let (site, style) = crawl_site(&args.url, &args.crawl).await?;

    println!(
        "{} pages, {} words, {} images ({} without alt text)",
        site.pages_analyzed, site.total_word_count, site.image_count, site.images_without_alt
    );
    println!("SEO score: {}/100", seo::assess(&site).score);
    if !style.colors.is_empty() {
        println!("Colors: {}", style.colors.join(", "));
    }
    if !style.fonts.is_empty() {
        println!("Fonts: {}", style.fonts.join(", "));
    }

    if let Some(output) = args.output {
        write_json(
            &output,
            &CrawlOutput {
                site: &site,
                style: &style,
            },
        )
        .await?;
    }
    Ok(())
}

fn pagespeed_client() -> anyhow::Result<PageSpeedClient> {
    let config = PageSpeedConfig::builder().api_key_from_env().build();
    Ok(PageSpeedClient::new(config)?)
}

async fn measure_both(client: &PageSpeedClient, url: &str) -> anyhow::Result<PerformanceReport> {
    let progress = spinner(&format!("Measuring {} (mobile and desktop)...", url))?;
    match client.analyze_url(url).await {
        Ok(report) => {
            progress.finish_with_message(format!(
                "Performance: mobile {:.0}, desktop {:.0}",
                report.mobile.performance_score * 100.0,
                report.desktop.performance_score * 100.0
            ));
            Ok(report)
        }
        Err(e) => {
            progress.abandon_with_message("PageSpeed measurement failed");
            Err(e.into())
        }
    }
}

#[instrument]
async fn performance_command(args: PerformanceArgs) -> anyhow::Result<()> {
    let client = pagespeed_client()?;

    let strategy = match args.strategy {
        StrategyArg::Mobile => Strategy::Mobile,
        StrategyArg::Desktop => Strategy::Desktop,
        StrategyArg::Both => {
            let report = measure_both(&client, &args.url).await?;
            if let Some(output) = args.output {
                write_json(&output, &report).await?;
            }
            return Ok(());
        }
    };

    let progress = spinner(&format!("Measuring {} ({})...", args.url, strategy))?;
    let document = match client.measure(&args.url, strategy).await {
        Ok(document) => document,
        Err(e) => {
            progress.abandon_with_message("PageSpeed measurement failed");
            return Err(e.into());
        }
    };
    progress.finish_with_message(format!(
        "Performance ({}): {:.0}",
        strategy,
        document.performance_score * 100.0
    ));
    for opportunity in document.opportunities.iter().take(5) {
        println!("[{}] {}", opportunity.impact, opportunity.title);
    }

    if let Some(output) = args.output {
        write_json(&output, &document).await?;
    }
    Ok(())
}

async fn extract_insights(site: &SiteDocument, skip: bool, free_tier: bool) -> anyhow::Result<AIInsightSet> {
    if skip {
        info!("LLM analysis skipped, using default insights");
        return Ok(AIInsightSet::default());
    }
    let api_key = std::env::var(GEMINI_API_KEY_VAR).ok();
    let extractor = match gemini_extractor(api_key.as_deref(), free_tier, InsightConfig::default()) {
        Ok(extractor) => extractor,
        Err(e) => {
            warn!("{}, using default insights", e);
            return Ok(AIInsightSet::default());
        }
    };

    let progress = spinner("Analyzing content with the LLM...")?;
    let insights = extractor.extract_all(site).await;
    progress.finish_with_message("Content analysis complete");
    Ok(insights)
}

#[instrument]
async fn audit_command(args: AuditArgs) -> anyhow::Result<()> {
    let (site, style) = crawl_site(&args.url, &args.crawl).await?;
    let base_url = site.base_url.clone();

    let performance = if args.skip_performance {
        None
    } else {
        let client = pagespeed_client()?;
        Some(measure_both(&client, &base_url).await?)
    };

    let insights = extract_insights(&site, args.skip_ai, args.free_tier).await?;

    let prompt = synthesize(&base_url, performance.as_ref(), &site, &insights);
    let generated_at = Utc::now();
    let exported = export_prompt(&prompt, args.prompt_format, generated_at)?;
    tokio::fs::write(&args.prompt_out, exported)
        .await
        .with_context(|| format!("failed to write {}", args.prompt_out.display()))?;
    println!("Saved {}", args.prompt_out.display());

    let report = AuditReport::build(
        &base_url,
        site,
        Some(style),
        performance,
        insights,
        generated_at,
    );
    report.write_to(&args.report)?;
    println!("Saved {}", args.report.display());

    for finding in &report.key_findings {
        println!("- {}", finding);
    }

    if args.render {
        markdown::print_markdown(&prompt)?;
    }
    Ok(())
}
