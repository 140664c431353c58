//! CLI command handler: layer defaults, config file, and flags into `DumpOpts`, then run the dump.

use anyhow::{Context, Result};
use log::debug;
use std::path::Path;
use std::time::Duration;

use crate::DumpOpts;
use crate::engine::arg_parser::Cli;
use crate::utils::{load_osdump_toml, resolve_password, setup_logging};

/// Overwrite opts field from the command line when given.
macro_rules! apply_cli_opt {
    ($cli:expr, $opts:expr, $cli_field:ident => $opts_field:ident) => {
        if let Some(ref v) = $cli.$cli_field {
            $opts.$opts_field = v.clone();
        }
    };
}

/// Defaults → config file → CLI. Password and output file are left empty when no layer set them.
pub fn build_opts(cli: &Cli, dir: &Path) -> Result<DumpOpts> {
    let mut opts = DumpOpts::default();
    if let Some(file) = load_osdump_toml(cli.config.as_deref(), dir)? {
        file.apply_to_opts(&mut opts);
    }
    apply_cli_opt!(cli, opts, base => base_url);
    apply_cli_opt!(cli, opts, user => user);
    apply_cli_opt!(cli, opts, password => password);
    apply_cli_opt!(cli, opts, ca => ca_path);
    apply_cli_opt!(cli, opts, index => index);
    apply_cli_opt!(cli, opts, size => window_size);
    apply_cli_opt!(cli, opts, file => output);
    apply_cli_opt!(cli, opts, queue_capacity => queue_capacity);
    apply_cli_opt!(cli, opts, progress => progress);
    if let Some(secs) = cli.timeout {
        opts.request_timeout = Some(Duration::from_secs(secs));
    }
    opts.compression = opts.compression.overlay(cli.brotli, cli.quality);
    if opts.output.as_os_str().is_empty() && !opts.index.is_empty() {
        opts.output = DumpOpts::default_output_for(&opts.index, opts.compression);
    }
    Ok(opts)
}

/// Run one dump from the command line.
pub fn handle_run(cli: &Cli) -> Result<()> {
    setup_logging(cli.verbose.unwrap_or(false));
    let dir = std::env::current_dir().context("resolve working directory")?;
    let mut opts = build_opts(cli, &dir)?;
    opts.validate()?;
    let explicit = Some(std::mem::take(&mut opts.password)).filter(|p| !p.is_empty());
    opts.password = resolve_password(explicit, &opts.user, &dir)?;
    let config_str = format!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_string().to_uppercase(),
        opts
    );
    debug!("{}", config_str);

    crate::dump_index(&opts)?;
    Ok(())
}
