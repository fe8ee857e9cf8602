use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{info, warn, LevelFilter};

use h1b_scraper_lib::{
    classify, logger, ClassifiedJob, Extractor, FileSink, HttpFetcher, JobSource, Pacer,
    Pipeline, RecordSink, ScraperConfig, Summary,
};

#[derive(Parser)]
#[command(name = "h1b-scraper", version, about = "Find recent job postings that mention H1B sponsorship")]
struct Cli {
    /// TOML configuration file; built-in defaults are used when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search the job boards live
    Scrape(ScrapeArgs),
    /// Extract and classify one saved result page
    Offline(OfflineArgs),
    /// Classify a piece of text and print the verdict
    Classify {
        text: String,
    },
}

#[derive(Args)]
struct FilterArgs {
    /// Recency window in hours
    #[arg(long)]
    window_hours: Option<u32>,

    /// Directory for CSV/JSON output
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Print the report without writing files
    #[arg(long)]
    no_export: bool,
}

#[derive(Args)]
struct ScrapeArgs {
    /// Search query (repeatable); replaces the configured list
    #[arg(short, long = "query")]
    queries: Vec<String>,

    /// Job board to search (repeatable): indeed, glassdoor, ziprecruiter, dice
    #[arg(short, long = "site")]
    sites: Vec<JobSource>,

    /// Result pages per query and site
    #[arg(short, long)]
    pages: Option<u32>,

    #[arg(long)]
    location: Option<String>,

    #[command(flatten)]
    filter: FilterArgs,
}

#[derive(Args)]
struct OfflineArgs {
    #[arg(long)]
    site: JobSource,

    /// Saved HTML of a result page
    #[arg(long)]
    file: PathBuf,

    #[command(flatten)]
    filter: FilterArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(if cli.verbose { LevelFilter::Debug } else { LevelFilter::Info });

    let mut config = ScraperConfig::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Command::Scrape(args) => {
            apply_scrape_overrides(&mut config, &args);
            config.validate()?;
            run_scrape(&config, !args.filter.no_export)
        }
        Command::Offline(args) => {
            apply_filter_overrides(&mut config, &args.filter);
            config.validate()?;
            run_offline(&config, args.site, &args.file, !args.filter.no_export)
        }
        Command::Classify { text } => {
            let result = classify(&text, &config.keywords);
            println!("sponsors_h1b: {}", result.sponsors_h1b);
            println!("confidence:   {}", result.confidence);
            println!("keywords:     {}", result.keywords_found.join("; "));
            Ok(())
        }
    }
}

fn apply_filter_overrides(config: &mut ScraperConfig, filter: &FilterArgs) {
    if let Some(hours) = filter.window_hours {
        config.window_hours = hours;
    }
    if let Some(dir) = &filter.output_dir {
        config.output_dir = dir.clone();
    }
}

fn apply_scrape_overrides(config: &mut ScraperConfig, args: &ScrapeArgs) {
    apply_filter_overrides(config, &args.filter);
    if !args.queries.is_empty() {
        config.queries = args.queries.clone();
    }
    if !args.sites.is_empty() {
        config.sites = args.sites.clone();
    }
    if let Some(pages) = args.pages {
        config.max_pages = pages;
    }
    if let Some(location) = &args.location {
        config.location = location.clone();
    }
}

fn run_scrape(config: &ScraperConfig, export: bool) -> Result<()> {
    info!("Starting job search for positions posted in the last {} hours...", config.window_hours);

    let fetcher = HttpFetcher::new(config).context("building HTTP client")?;
    let extractor = Extractor::new()?;
    let mut pacer = Pacer::new(config.delay);
    let pipeline = Pipeline::from_config(config);

    let (jobs, stats) = pipeline.scrape(
        &fetcher,
        &extractor,
        &mut pacer,
        &config.queries,
        &config.sites,
        config.max_pages,
    );
    info!(
        "Saw {} listings: {} invalid, {} too old, {} off-target, {} duplicates",
        stats.candidates_seen, stats.dropped_invalid, stats.dropped_stale, stats.dropped_off_target, stats.duplicates
    );
    if stats.pages_fetched == 0 {
        warn!("No result page could be retrieved. The job boards are most likely blocking automated requests.");
    }

    finish(config, &jobs, export)
}

fn run_offline(config: &ScraperConfig, site: JobSource, file: &Path, export: bool) -> Result<()> {
    let html = fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let extractor = Extractor::new()?;
    let pipeline = Pipeline::from_config(config);

    let jobs = match pipeline.process_page(&extractor, site, &html) {
        Ok(jobs) => jobs,
        Err(e) => {
            warn!("Could not parse {}: {}", file.display(), e);
            Vec::new()
        }
    };
    finish(config, &jobs, export)
}

fn finish(config: &ScraperConfig, jobs: &[ClassifiedJob], export: bool) -> Result<()> {
    let summary = Summary::from_jobs(jobs, config.top_n);
    println!("{}", summary);

    if export {
        let sink = FileSink::new(&config.output_dir, &config.file_prefix);
        let written = sink.persist(jobs, &summary).context("writing results")?;
        info!("Wrote {} files to {}", written.len(), config.output_dir.display());
    }
    info!("Job parsing completed!");
    Ok(())
}
