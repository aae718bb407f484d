//! Sitecrawl main entry point
//!
//! This is the command-line interface for the `crawler` binary.

use anyhow::Context;
use clap::Parser;
use sitecrawl::config::{load_file_config, parse_args, USAGE};
use sitecrawl::crawler::crawl;
use sitecrawl::output::{print_banner, print_statistics, ConsoleObserver};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Sitecrawl: a bounded, concurrent same-site crawler
///
/// Crawls every page reachable from BASE_URL, up to MAX_PAGES distinct
/// pages with at most MAX_CONCURRENCY fetches in flight, and reports how
/// often each page was linked. Optional KEY=VALUE settings:
/// selectors, selector_type, output_format, filter, same_origin,
/// user_agent, timeout, database.
#[derive(Parser, Debug)]
#[command(name = "crawler")]
#[command(version)]
#[command(about = "A bounded, concurrent same-site crawler", long_about = None)]
struct Cli {
    /// URL the crawl starts from
    #[arg(value_name = "BASE_URL")]
    base_url: String,

    /// Maximum number of simultaneous fetches
    #[arg(value_name = "MAX_CONCURRENCY")]
    max_concurrency: String,

    /// Maximum number of distinct pages to visit
    #[arg(value_name = "MAX_PAGES")]
    max_pages: String,

    /// Optional settings such as selectors=h1,p or output_format=json
    #[arg(value_name = "KEY=VALUE")]
    options: Vec<String>,

    /// TOML file supplying defaults for the optional settings
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn arguments(&self) -> Vec<&str> {
        [
            self.base_url.as_str(),
            self.max_concurrency.as_str(),
            self.max_pages.as_str(),
        ]
        .into_iter()
        .chain(self.options.iter().map(String::as_str))
        .collect()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let file_config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading defaults from: {}", path.display());
            match load_file_config(path) {
                Ok(file) => Some(file),
                Err(e) => exit_with_usage(&format!("{}: {}", path.display(), e)),
            }
        }
        None => None,
    };

    let config = match parse_args(&cli.arguments(), file_config.as_ref()) {
        Ok(config) => config,
        Err(e) => exit_with_usage(&e.to_string()),
    };

    print_banner(&config);

    let format = config.output_format;
    let observer = Arc::new(ConsoleObserver::new(format));
    let report = crawl(config, observer).await.context("Crawl failed")?;

    print!(
        "{}",
        report.render(format).context("Failed to render report")?
    );
    if !cli.quiet {
        print_statistics(&report.stats);
    }

    Ok(())
}

/// Prints a configuration error with the usage line and exits with status 1
fn exit_with_usage(message: &str) -> ! {
    eprintln!("Error: {}", message);
    eprintln!("{}", USAGE);
    std::process::exit(1);
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout carries the banner, streamed records and the
/// report.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitecrawl=info,warn"),
            1 => EnvFilter::new("sitecrawl=debug,info"),
            2 => EnvFilter::new("sitecrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
