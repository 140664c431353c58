use clap::Parser;
use std::path::PathBuf;

/// Export a whole OpenSearch/Elasticsearch index to an NDJSON file.
#[derive(Clone, Parser)]
#[command(name = "osdump")]
#[command(about = "Dump every document of an index to a file, one JSON document per line.")]
pub struct Cli {
    /// Config file. Default: `.osdump.toml` in the working directory, if present.
    #[arg(long, short = 'C')]
    pub config: Option<PathBuf>,

    /// Search service base URL (https enables CA verification). Default: https://localhost:9200
    #[arg(long, short)]
    pub base: Option<String>,

    /// User for Basic authentication. Default: graylog
    #[arg(long, short)]
    pub user: Option<String>,

    /// Password. Falls back to OSDUMP_PASSWORD / .env, then a prompt.
    #[arg(long)]
    pub password: Option<String>,

    /// CA certificate (PEM) used to verify the service. Default: ca.pem
    #[arg(long)]
    pub ca: Option<PathBuf>,

    /// Index to dump.
    #[arg(long, short)]
    pub index: Option<String>,

    /// Search window size (documents per page). Default: 1000
    #[arg(long, short, value_parser = clap::value_parser!(usize))]
    pub size: Option<usize>,

    /// Target file for the export; must not exist. Default: <index>.json (.json.br with --brotli)
    #[arg(long, short)]
    pub file: Option<PathBuf>,

    /// Compress the output with brotli.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub brotli: Option<bool>,

    /// Brotli quality, 0-11. Default: 2
    #[arg(long, short, value_parser = clap::value_parser!(u32))]
    pub quality: Option<u32>,

    /// Capacity of the queue between fetching and writing. Default: 100000
    #[arg(long, value_parser = clap::value_parser!(usize))]
    pub queue_capacity: Option<usize>,

    /// Per-request timeout in seconds. Default: none
    #[arg(long, value_parser = clap::value_parser!(u64))]
    pub timeout: Option<u64>,

    /// Show a progress bar while writing.
    #[arg(long, short = 'p', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub progress: Option<bool>,

    /// Debug logging.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}
