// Command-line entry point for exprkey.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use exprkey::api::DistributionReport;
use exprkey::application::{ComparerConfig, ExpressionEqualityComparer};
use exprkey::domain::corpus;
use exprkey::infrastructure::concurrency::init_thread_pool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Hash a synthetic corpus of expression trees and report the hash distribution.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Number of trees to generate
    #[arg(short, long, default_value_t = 10_000)]
    count: usize,

    /// Comparer configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Disable the identity hash cache
    #[arg(long)]
    no_cache: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to install log subscriber")?;

    let mut config = match &cli.config {
        Some(path) => ComparerConfig::load(path)
            .with_context(|| format!("cannot load configuration from {}", path.display()))?,
        None => ComparerConfig::default(),
    };
    if cli.no_cache {
        config.cache_hash_codes = false;
    }

    init_thread_pool()?;

    let text = cli.format == Format::Text;
    if text {
        println!("[exprkey] Generating {} trees ({} templates)", cli.count, corpus::template_count());
    }
    let trees = corpus::corpus(cli.count).context("failed to build corpus")?;
    let twins = corpus::corpus(cli.count).context("failed to build twin corpus")?;

    let comparer = ExpressionEqualityComparer::new(&config);
    let started = Instant::now();
    let analysis = comparer.analyze_corpus(&trees, &twins);
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let report = DistributionReport::from(analysis).with_run_info(comparer.is_caching(), elapsed_ms);
    match cli.format {
        Format::Text => {
            println!("[exprkey] Analysis complete");
            println!("{}", report.to_text());
        }
        Format::Json => {
            println!("{}", serde_json::to_string_pretty(&report).context("failed to serialize report")?);
        }
    }

    if report.twins != report.trees {
        bail!("{} trees but {} twins", report.trees, report.twins);
    }
    if !report.is_healthy() {
        bail!(
            "{} of {} twins compared unequal, {} contract violations",
            report.trees - report.twins_equal,
            report.trees,
            report.contract_violations
        );
    }
    Ok(())
}
