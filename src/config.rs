//! Command-line configuration for the `freshfeed` binary.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use freshfeed::default_cache_path;

/// Feed shown when no URL is given.
pub const DEFAULT_FEED_URL: &str = "https://feeds.bbci.co.uk/news/rss.xml";

/// A live-updating RSS reader that shows the cached feed instantly and
/// refreshes it in the background.
#[derive(Parser, Debug)]
#[command(name = "freshfeed", version)]
pub struct Args {
    /// Feed URL
    #[arg(default_value = DEFAULT_FEED_URL)]
    pub url: String,

    /// Label shown next to every item from this feed
    #[arg(short, long, default_value = "RSS")]
    pub label: String,

    /// Cache file (defaults to a per-URL file in the user cache directory)
    #[arg(long, value_name = "PATH")]
    pub cache_file: Option<PathBuf>,

    /// Seconds between automatic refreshes
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pub refresh_secs: u64,

    /// Seconds before a feed request is abandoned
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: u64,

    /// Log file (logs never go to the terminal the UI is drawn on)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Fully resolved settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub url: String,
    pub label: String,
    pub cache_file: PathBuf,
    pub refresh_interval: Duration,
    pub request_timeout: Duration,
    pub log_file: PathBuf,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self> {
        let cache_file = match args.cache_file {
            Some(path) => path,
            None => default_cache_path(&args.url)
                .context("no user cache directory; pass --cache-file")?,
        };
        let log_file = match args.log_file {
            Some(path) => path,
            None => cache_file.with_file_name("freshfeed.log"),
        };

        Ok(Self {
            url: args.url,
            label: args.label,
            cache_file,
            refresh_interval: Duration::from_secs(args.refresh_secs),
            request_timeout: Duration::from_secs(args.timeout_secs),
            log_file,
        })
    }
}
