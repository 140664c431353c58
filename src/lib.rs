//! osdump: bulk export of a search index to NDJSON via `search_after` pagination

pub mod engine;
pub mod error;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use error::{DumpError, ErrorKind};

use std::sync::Arc;

use crate::engine::transport::{HttpTransport, SearchTransport};

/// Result alias used by public osdump API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Dump `opts.index` to `opts.output` over HTTP(S). Blocks until the file is complete.
///
/// Any failure is fatal for the run: nothing is retried, and a partial output file is left in
/// place (a rerun against the same path fails until it is removed).
pub fn dump_index(opts: &DumpOpts) -> Result<DumpStats> {
    let transport = HttpTransport::from_opts(opts)?;
    dump_index_with(opts, Arc::new(transport))
}

/// Same as [`dump_index`] with a caller-supplied transport (e.g. a different HTTP stack or a fake).
pub fn dump_index_with<T>(opts: &DumpOpts, transport: Arc<T>) -> Result<DumpStats>
where
    T: SearchTransport + ?Sized + 'static,
{
    pipeline::run_dump(opts, transport)
}
