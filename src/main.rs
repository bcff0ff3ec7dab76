mod etl;
mod data;
mod errors;

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::info;
use serde::Deserialize;
use structured_logger::json::new_writer;
use structured_logger::Builder;

use crate::errors::{Error, Result};
use crate::etl::highway_report::HighwayReportEtl;
use crate::etl::Etl;

/// Used when neither the command line, the environment nor a config file names an input.
const DEFAULT_DATA_PATH: &str = "map.osm";

fn default_log_level() -> String {
    "info".to_string()
}

/// Prints the (width, surface) combinations seen per highway value in an OSM XML file
#[derive(Parser, Debug)]
#[command(name = "highway_report", version, about, long_about = None)]
struct Cli {
    /// Plain .osm file or xz-compressed .osm.xz file
    #[arg(env = "HIGHWAY_REPORT_INPUT")]
    input: Option<String>,

    /// JSON file with `data_path` and optional `log_level`
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserConfig {
    pub data_path: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn load_user_config(path: &Path) -> Result<UserConfig> {
    let file = File::open(path)
        .map_err(|err| Error::config(format!("could not open config file {}: {}", path.display(), err)))?;
    Ok(serde_json::from_reader(file)?)
}

/// The input named on the command line (or its env var) beats the config
/// file, which beats the default path.
fn resolve_config(cli: &Cli) -> Result<UserConfig> {
    let mut config = match &cli.config {
        Some(path) => load_user_config(path)?,
        None => UserConfig {
            data_path: DEFAULT_DATA_PATH.to_string(),
            log_level: default_log_level(),
        },
    };
    if let Some(input) = &cli.input {
        config.data_path = input.clone();
    }
    Ok(config)
}

fn setup_logging(level: &str) {
    Builder::with_level(level)
        .with_target_writer("*", new_writer(io::stderr()))
        .init();
}

fn run(config: &UserConfig) -> Result<()> {
    info!(data_path = config.data_path; "Generating highway report");
    let stdout = io::stdout();
    let mut etl = HighwayReportEtl::new(&config.data_path, BufWriter::new(stdout.lock()));
    etl.process()
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {}", err);
            return ExitCode::FAILURE;
        },
    };

    setup_logging(&config.log_level);

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.is_parse() => {
            eprintln!("Error parsing XML: {}", err);
            ExitCode::FAILURE
        },
        Err(err) => {
            eprintln!("Error writing report: {}", err);
            ExitCode::FAILURE
        },
    }
}
