//! Engine module: query building, transport, progress, and the CLI surface

pub mod arg_parser;
pub mod cli;
pub mod progress;
pub mod query;
pub mod transport;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use cli::{build_opts, handle_run};
pub use query::build_search_query;
pub use transport::{Endpoints, HttpTransport, SearchTransport, fetch_document_count};
