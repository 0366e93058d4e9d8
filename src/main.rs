//! csvclean - CSV to XLSX conversion with allow-list text sanitization

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use csvclean::{convert, Config};

const SUCCESS_NOTICE: &str = "转换成功";
const ERROR_NOTICE: &str = "转换错误";

/// Convert a CSV file to XLSX, keeping only CJK, full-width and hyphen characters in text cells
#[derive(Parser, Debug)]
#[command(name = "csvclean")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Source CSV file (UTF-8, optional byte-order mark)
    source: PathBuf,

    /// Destination XLSX file
    destination: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // stdout carries only the one-line notice
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_writer(std::io::stderr)
        .try_init();

    let config = Config::new(cli.source, cli.destination);
    match convert(&config) {
        Ok(summary) => {
            info!(
                rows = summary.rows,
                columns = summary.columns,
                "conversion finished"
            );
            println!("{}", SUCCESS_NOTICE);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(stage = e.stage(), error = %e, "conversion failed");
            println!("{}: {}", ERROR_NOTICE, e);
            ExitCode::from(1)
        }
    }
}
