use alba::build::build_site;
use alba::config::Config;
use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use std::path::PathBuf;

/// Builds a static site from a tree of hand-authored HTML posts.
///
/// Reads `posts/<category>/<slug>/index.html`, `templates/` and an optional
/// `alba.yaml` from the project directory. Set `SITE_URL` to override the
/// configured base URL.
#[derive(Parser)]
#[command(name = "alba", version, about)]
struct Cli {
    /// The project directory
    #[arg(default_value = ".")]
    project: PathBuf,

    /// Where to write the site (default: `<project>/dist`)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Build date as YYYY-MM-DD (default: today, UTC). Fixes the featured
    /// posts rotation and the footer year.
    #[arg(long)]
    date: Option<NaiveDate>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("alba=info")),
        )
        .init();

    let cli = Cli::parse();
    let build_date = cli.date.unwrap_or_else(|| Utc::now().date_naive());
    let site_url = std::env::var("SITE_URL").ok();
    let config = Config::from_directory(
        &cli.project,
        cli.output.as_deref(),
        build_date,
        site_url.as_deref(),
    )?;

    build_site(&config)
        .with_context(|| format!("Building site in `{}`", cli.project.display()))?;
    Ok(())
}
