//! # TileIntel CLI
//!
//! Command-line front end for the tiling estimator and method statement
//! renderer.
//!
//! ```text
//! tileintel estimate --area 20 --tile 300x300 --substrate concrete
//! tileintel render --area 20 --ufh --project "14 Mill Lane" --out statement.pdf
//! tileintel interactive
//! ```

mod cli;
mod logging;
mod prompt;
mod report;
mod session;

use std::process::ExitCode;

use clap::Parser;
use tile_core::TileError;

use crate::cli::{run, Cli};
use crate::logging::init_logger;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            match e.downcast_ref::<TileError>() {
                Some(tile_err) => {
                    eprintln!("Code:  {}", tile_err.error_code());
                    if tile_err.is_invalid_input() {
                        ExitCode::from(2)
                    } else {
                        ExitCode::FAILURE
                    }
                }
                None => ExitCode::FAILURE,
            }
        }
    }
}
