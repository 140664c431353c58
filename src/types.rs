//! Public types for the osdump API and pipeline.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::DumpError;
use crate::utils::config::{
    BROTLI_EXTENSION, BrotliConsts, DefaultSettings, OUTPUT_EXTENSION, QUEUE_CAPACITY,
};

/// Last-seen sort key. `None` in [`PipelineState`](crate::pipeline::PipelineState) means "start of index".
pub type Cursor = String;

/// One exported document: its JSON without the `sort` annotation. Moved from paginator to queue to
/// sink writer, never shared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record(Vec<u8>);

impl Record {
    pub fn new(bytes: Vec<u8>) -> Self {
        Record(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Output stream encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Compression {
    #[default]
    None,
    /// Streaming brotli at `quality` (0..=11).
    Brotli { quality: u32 },
}

impl Compression {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Compression::None)
    }

    /// Apply an on/off switch and a quality from a higher config layer. Either may be unset.
    /// A quality alone does not turn compression on.
    pub fn overlay(self, brotli: Option<bool>, quality: Option<u32>) -> Compression {
        let current_quality = match self {
            Compression::Brotli { quality } => quality,
            Compression::None => BrotliConsts::DEFAULT_QUALITY,
        };
        let quality = quality.unwrap_or(current_quality);
        match brotli.unwrap_or(self.is_enabled()) {
            true => Compression::Brotli { quality },
            false => Compression::None,
        }
    }
}

/// Everything one export run needs. Built once by the caller and only read by the pipeline.
#[derive(Clone)]
pub struct DumpOpts {
    /// Search service base URL, e.g. `https://localhost:9200`. `https` turns on CA verification.
    pub base_url: String,
    pub user: String,
    pub password: String,
    /// PEM file with the CA that signed the service certificate (https only).
    pub ca_path: PathBuf,
    /// Index to export.
    pub index: String,
    /// Documents requested per page.
    pub window_size: usize,
    /// Output file; must not exist yet.
    pub output: PathBuf,
    pub compression: Compression,
    /// Capacity of the paginator → sink writer queue.
    pub queue_capacity: usize,
    /// Per-request timeout. `None` waits as long as the service takes.
    pub request_timeout: Option<Duration>,
    /// Draw a progress bar on stderr while writing.
    pub progress: bool,
}

impl Default for DumpOpts {
    fn default() -> Self {
        DumpOpts {
            base_url: DefaultSettings::BASE_URL.to_string(),
            user: DefaultSettings::USER.to_string(),
            password: String::new(),
            ca_path: PathBuf::from(DefaultSettings::CA_PATH),
            index: String::new(),
            window_size: DefaultSettings::WINDOW_SIZE,
            output: PathBuf::new(),
            compression: Compression::None,
            queue_capacity: QUEUE_CAPACITY,
            request_timeout: None,
            progress: false,
        }
    }
}

impl fmt::Debug for DumpOpts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DumpOpts")
            .field("base_url", &self.base_url)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("ca_path", &self.ca_path)
            .field("index", &self.index)
            .field("window_size", &self.window_size)
            .field("output", &self.output)
            .field("compression", &self.compression)
            .field("queue_capacity", &self.queue_capacity)
            .field("request_timeout", &self.request_timeout)
            .field("progress", &self.progress)
            .finish()
    }
}

impl DumpOpts {
    /// True when the base URL needs TLS (and therefore the CA file).
    pub fn uses_tls(&self) -> bool {
        self.base_url.starts_with("https")
    }

    /// `<index>.json`, or `<index>.json.br` when compressing.
    pub fn default_output_for(index: &str, compression: Compression) -> PathBuf {
        if compression.is_enabled() {
            PathBuf::from(format!("{index}.{OUTPUT_EXTENSION}.{BROTLI_EXTENSION}"))
        } else {
            PathBuf::from(format!("{index}.{OUTPUT_EXTENSION}"))
        }
    }

    /// Reject settings the pipeline cannot run with. Called before anything touches the network.
    pub fn validate(&self) -> Result<(), DumpError> {
        if self.base_url.is_empty() {
            return Err(DumpError::Config("base URL is empty".into()));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(DumpError::Config(format!(
                "base URL {} must start with http:// or https://",
                self.base_url
            )));
        }
        if self.index.is_empty() {
            return Err(DumpError::Config("no index given".into()));
        }
        if self.window_size == 0 {
            return Err(DumpError::Config("window size must be at least 1".into()));
        }
        if self.queue_capacity == 0 {
            return Err(DumpError::Config("queue capacity must be at least 1".into()));
        }
        if self.output.as_os_str().is_empty() {
            return Err(DumpError::Config("no output file given".into()));
        }
        if let Compression::Brotli { quality } = self.compression
            && quality > BrotliConsts::MAX_QUALITY
        {
            return Err(DumpError::Config(format!(
                "brotli quality {quality} is out of range 0..={}",
                BrotliConsts::MAX_QUALITY
            )));
        }
        Ok(())
    }
}

/// Final report of a finished run.
#[derive(Clone, Debug)]
pub struct DumpStats {
    /// Records handed to the queue (and written).
    pub records: u64,
    /// Search requests issued, including the final empty page.
    pub pages: u64,
    /// Document count the service reported before the run.
    pub expected: u64,
    pub elapsed: Duration,
}

impl DumpStats {
    pub fn records_per_sec(&self) -> u64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            (self.records as f64 / secs) as u64
        } else {
            0
        }
    }
}
