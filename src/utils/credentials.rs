//! Password lookup for the search service: explicit value → env var → .env in dir → secure prompt.

use anyhow::{Context, Result};
use colored::Colorize;
use log::info;
use std::path::Path;

use crate::utils::config::PackagePaths;

fn try_env_then_dotenv(dir: &Path) -> Option<String> {
    let key = PackagePaths::get().password_env_key();
    if let Ok(s) = std::env::var(key)
        && !s.trim().is_empty()
    {
        return Some(s.trim().to_string());
    }
    let env_path = dir.join(".env");
    if env_path.is_file() {
        let _ = dotenvy::from_path(&env_path);
        if let Ok(s) = std::env::var(key)
            && !s.trim().is_empty()
        {
            return Some(s.trim().to_string());
        }
    }
    None
}

/// Resolve the password for `user`. `explicit` comes from the CLI or the config file and wins.
/// Otherwise `OSDUMP_PASSWORD`, then `.env` in `dir`, then a prompt on the terminal.
pub fn resolve_password(explicit: Option<String>, user: &str, dir: &Path) -> Result<String> {
    if let Some(p) = explicit {
        return Ok(p);
    }
    if let Some(s) = try_env_then_dotenv(dir) {
        info!("Password found in environment");
        return Ok(s);
    }
    let label = format!("[{}]", env!("CARGO_PKG_NAME")).cyan().bold();
    let pass = rpassword::prompt_password(format!("{} Password for {}: ", label, user))
        .context("read password")?;
    Ok(pass.trim_end_matches(['\r', '\n']).to_string())
}
