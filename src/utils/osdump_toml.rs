//! Load `.osdump.toml` (CLI only). Lib callers build [`DumpOpts`] themselves.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::DumpOpts;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OsdumpToml {
    #[serde(default)]
    source: SourceSection,
    #[serde(default)]
    output: OutputSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SourceSection {
    base_url: Option<String>,
    user: Option<String>,
    password: Option<String>,
    ca: Option<PathBuf>,
    index: Option<String>,
    window_size: Option<usize>,
    request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct OutputSection {
    file: Option<PathBuf>,
    brotli: Option<bool>,
    quality: Option<u32>,
    queue_capacity: Option<usize>,
    progress: Option<bool>,
}

/// Load the config file. With `explicit` the file must exist and parse; otherwise
/// `.osdump.toml` in `dir` is optional (missing → `None`), but a broken one is still an error.
pub fn load_osdump_toml(explicit: Option<&Path>, dir: &Path) -> Result<Option<OsdumpToml>> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let p = dir.join(PackagePaths::get().config_filename());
            if !p.is_file() {
                return Ok(None);
            }
            p
        }
    };
    let s = std::fs::read_to_string(&path)
        .with_context(|| format!("read config file {}", path.display()))?;
    let parsed = parse_osdump_toml(&s).with_context(|| format!("parse {}", path.display()))?;
    log::debug!("Loaded config file {}", path.display());
    Ok(Some(parsed))
}

pub fn parse_osdump_toml(s: &str) -> Result<OsdumpToml> {
    Ok(toml::from_str(s)?)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($sec:expr, $opts:expr, $sec_field:ident => $opts_field:ident) => {
        if let Some(ref v) = $sec.$sec_field {
            $opts.$opts_field = v.clone();
        }
    };
}

impl OsdumpToml {
    /// Apply file config to opts (only fields present in the file). Call before applying CLI.
    pub fn apply_to_opts(&self, opts: &mut DumpOpts) {
        let src = &self.source;
        apply_file_opt!(src, opts, base_url => base_url);
        apply_file_opt!(src, opts, user => user);
        apply_file_opt!(src, opts, password => password);
        apply_file_opt!(src, opts, ca => ca_path);
        apply_file_opt!(src, opts, index => index);
        apply_file_opt!(src, opts, window_size => window_size);
        if let Some(secs) = src.request_timeout_secs {
            opts.request_timeout = Some(Duration::from_secs(secs));
        }

        let out = &self.output;
        apply_file_opt!(out, opts, file => output);
        apply_file_opt!(out, opts, queue_capacity => queue_capacity);
        apply_file_opt!(out, opts, progress => progress);
        opts.compression = opts.compression.overlay(out.brotli, out.quality);
    }
}
