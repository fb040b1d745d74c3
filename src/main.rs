#![forbid(unsafe_code)]
//! # Mead Report CLI
//!
//! This is the command-line interface for the `mead_report` crate.
//! It renders one PDF per tasting instance found under the instances directory.
//!
//! ## Input layout
//! ```text
//! data/instances/<name>/<name>.csv
//! data/instances/<name>/id_name_map.csv
//! ```
//!
//! ## Example
//! ```bash
//! cargo run --release
//! RUST_LOG=debug cargo run --release -- --output-dir reports --fail-fast
//! ```
//!
//! Without arguments every instance under `data/instances` is rendered into the current
//! directory. See `--help` for all available options.

use clap::Parser;
use log::error;
use mead_report::report::DEFAULT_INSTANCES_DIR;
use mead_report::{ReportOptions, print_failed_instances, run};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Directory holding one sub-directory per tasting instance
    #[arg(long, default_value = DEFAULT_INSTANCES_DIR)]
    instances_dir: PathBuf,

    /// Directory the PDF reports are written to
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Resolution of every 1920x1080 pixel page
    #[arg(long, default_value_t = 100.0, value_parser = parse_dpi)]
    dpi: f64,

    /// Stop at the first instance that fails instead of rendering the rest (default: false)
    #[arg(long, default_value_t = false)]
    fail_fast: bool,
}

fn parse_dpi(raw: &str) -> Result<f64, String> {
    let dpi: f64 = raw.parse().map_err(|e| format!("{e}"))?;
    if dpi.is_finite() && dpi > 0.0 {
        Ok(dpi)
    } else {
        Err(format!("dpi must be a positive number, got {raw}"))
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let options = ReportOptions {
        instances_dir: cli.instances_dir,
        output_dir: cli.output_dir,
        dpi: cli.dpi,
        fail_fast: cli.fail_fast,
    };

    match run(&options) {
        Ok(summary) => {
            for path in &summary.written {
                println!("{}", path.display());
            }
            if !summary.is_success() {
                print_failed_instances(&summary.failed);
                process::exit(1);
            }
        }
        Err(e) => {
            error!("Error: {}", e);
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
