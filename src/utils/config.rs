//! Application configuration constants.
//! Defaults and tuning in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    config_filename: String,
    password_env_key: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                config_filename: format!(".{pkg}.toml"),
                password_env_key: format!("{}_PASSWORD", pkg.to_uppercase()),
            }
        })
    }

    /// Config file looked up in the working directory (e.g. `.osdump.toml`).
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    /// Environment variable holding the search password (e.g. `OSDUMP_PASSWORD`).
    pub fn password_env_key(&self) -> &str {
        &self.password_env_key
    }
}

// ---- Connection / pagination defaults ----

/// Defaults used when neither the config file nor the CLI sets a value.
pub struct DefaultSettings;

impl DefaultSettings {
    pub const BASE_URL: &'static str = "https://localhost:9200";
    pub const USER: &'static str = "graylog";
    pub const CA_PATH: &'static str = "ca.pem";
    /// Documents requested per page.
    pub const WINDOW_SIZE: usize = 1000;
}

// ---- Work queue ----

/// Fixed capacity of the queue between paginator and sink writer. Large enough to absorb
/// several pages while the disk catches up; a full queue is what stalls the network side.
pub const QUEUE_CAPACITY: usize = 100_000;

// ---- Output ----

/// Brotli encoder settings.
pub struct BrotliConsts;

impl BrotliConsts {
    pub const DEFAULT_QUALITY: u32 = 2;
    pub const MAX_QUALITY: u32 = 11;
    /// Log2 of the sliding window (22 = 4 MiB, the encoder's usual default).
    pub const LG_WINDOW: u32 = 22;
    /// Internal buffer of the streaming compressor (bytes).
    pub const BUFFER_SIZE: usize = 64 * 1024;
}

/// Buffer between the writer (or compressor) and the output file (bytes). 1 MB.
pub const WRITE_BUFFER_SIZE: usize = 1024 * 1024;

/// Extension of the default output file name.
pub const OUTPUT_EXTENSION: &str = "json";
/// Extra extension appended when brotli compression is on.
pub const BROTLI_EXTENSION: &str = "br";

// ---- Progress ----

/// Progress bar tuning.
pub struct ProgressConsts;

impl ProgressConsts {
    /// Records written between progress bar refreshes.
    pub const PROGRESS_UPDATE_BATCH_SIZE: usize = 1000;
}

// ---- Logging ----

/// Max bytes of a response body quoted in an error or debug message.
pub const BODY_SNIPPET_LEN: usize = 512;
