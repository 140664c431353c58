//! osdump CLI: export one index to a local file.

use anyhow::Result;
use clap::Parser;
use osdump::engine::arg_parser::Cli;
use osdump::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
