//! Command line front end for booru-rank-dl

use booru_rank_dl::utils::create_output_dir;
use booru_rank_dl::{Config, Error, RankingPipeline, Result, RunSummary, sanitize_tags};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Download the top 100 highest-scored posts of an image board tag search
#[derive(Parser, Debug)]
#[command(name = "booru-rank-dl", version)]
struct Cli {
    /// Number of listing pages to crawl
    #[arg(
        value_name = "PAGE_COUNT",
        value_parser = parse_page_count,
        allow_negative_numbers = true
    )]
    page_count: usize,

    /// Search tags; whitespace inside a tag becomes `_`
    #[arg(
        value_name = "TAG",
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    tags: Vec<String>,
}

fn parse_page_count(raw: &str) -> Result<usize> {
    let count: i64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::InvalidArgument(format!("{} is not an integer", raw)))?;
    if count < 1 {
        return Err(Error::InvalidArgument("page count should be positive".to_string()));
    }
    usize::try_from(count).map_err(|_| Error::InvalidArgument(format!("{} is too large", raw)))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("booru_rank_dl=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<RunSummary> {
    let config = Config::from_env()?;
    config.validate()?;

    let tags = sanitize_tags(&cli.tags);
    let output_dir = create_output_dir(&std::env::current_dir()?, &config.output_base)?;
    tracing::info!(output_dir = %output_dir.display(), "Output directory created");

    let pipeline = RankingPipeline::new(&config, output_dir)?;
    Ok(pipeline.run(cli.page_count, &tags).await)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are not failures
            let code = if e.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
            let _ = e.print();
            return code;
        }
    };

    init_tracing();

    match run(cli).await {
        Ok(summary) => {
            tracing::info!(
                downloaded = summary.downloaded,
                failed = summary.posts_failed,
                ranked = summary.ranked,
                pages_failed = summary.pages_failed,
                output_dir = %summary.output_dir.display(),
                "Finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Run could not start");
            ExitCode::from(1)
        }
    }
}
