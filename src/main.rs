// Command-line entry point for kodegen-sitemirror.
//
// Parses flags into a MirrorConfig, runs one mirror to exhaustion and prints
// the run summary. Exits 0 once traversal finishes, however many pages failed.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use kodegen_tools_sitemirror::{CrawlSummary, MirrorConfig, mirror_site};

#[derive(Parser, Debug)]
#[command(
    name = "kodegen-sitemirror",
    version,
    about = "Mirror a website's rendered pages and images to disk",
    long_about = "Crawls a site depth-first from START_URL with headless Chromium, staying on the \
                  seed's domain. Each page lands in OUTPUT/<path>/index.html with its images \
                  under OUTPUT/<path>/media/."
)]
struct Cli {
    /// Seed URL; a bare host gets https://
    start_url: String,

    /// Mirror root directory
    #[arg(short, long, default_value = "site_mirror")]
    output: PathBuf,

    /// Deepest link level to fetch (the seed is depth 0)
    #[arg(long, default_value_t = 5)]
    max_depth: u8,

    /// Host substring that keeps a link in scope (defaults to the seed host)
    #[arg(long)]
    domain: Option<String>,

    /// Pages rendered at the same time; 1 keeps strict depth-first order
    #[arg(short, long, default_value_t = 1)]
    concurrency: usize,

    /// Navigation timeout per page, in seconds
    #[arg(long, default_value_t = 45)]
    timeout_secs: u64,

    /// Pause after the document loads before reading it, in milliseconds
    #[arg(long, default_value_t = 1000)]
    settle_ms: u64,

    /// User agent presented to every site
    #[arg(long)]
    user_agent: Option<String>,

    /// Show the browser window (debug builds only)
    #[arg(long)]
    headed: bool,

    /// Print the summary as JSON instead of text
    #[arg(long)]
    summary_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;

    tracing::debug!(
        "Effective configuration: {}",
        serde_json::to_string(&config).context("Failed to serialize configuration")?
    );

    let summary = mirror_site(config).await?;

    if cli.summary_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?
        );
    } else {
        print_summary(&summary);
    }

    Ok(())
}

fn build_config(cli: &Cli) -> Result<MirrorConfig> {
    let mut builder = MirrorConfig::builder()
        .storage_dir(cli.output.clone())
        .start_url(cli.start_url.clone())
        .max_depth(cli.max_depth)
        .max_concurrent_pages(cli.concurrency)
        .page_load_timeout_secs(cli.timeout_secs)
        .settle_delay_ms(cli.settle_ms)
        .headless(!cli.headed);

    if let Some(domain) = &cli.domain {
        builder = builder.crawl_domain(domain.clone());
    }
    if let Some(user_agent) = &cli.user_agent {
        builder = builder.user_agent(user_agent.clone());
    }

    builder.build().context("Invalid mirror configuration")
}

fn print_summary(summary: &CrawlSummary) {
    println!("Mirror complete in {:.1}s", summary.elapsed_ms as f64 / 1000.0);
    println!("  pages saved:      {}", summary.pages_persisted);
    println!("  pages failed:     {}", summary.pages_failed);
    println!(
        "  links skipped:    {} out of scope, {} too deep, {} already visited",
        summary.rejected_scope, summary.rejected_depth, summary.rejected_duplicate
    );
    println!(
        "  images:           {} saved, {} already present, {} failed",
        summary.images_saved, summary.images_already_present, summary.images_failed
    );
}
