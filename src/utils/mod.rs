pub mod config;
pub mod credentials;
pub mod logger;
pub mod osdump_toml;

pub use config::*;
pub use credentials::resolve_password;
pub use logger::setup_logging;
pub use osdump_toml::{OsdumpToml, load_osdump_toml};
