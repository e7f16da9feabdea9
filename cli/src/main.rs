use std::{fs, process::ExitCode};

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use log::{error, info};
use processor::{normalize, painted_map, summarize, validate, GuardRecord, Summary};
use serde_json::Value;

use crate::errors::CliError;

mod errors;
mod render;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log progress (RUST_LOG takes precedence)
    #[clap(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Convert guard data of any version into the worker format
    Normalize {
        in_file: String,
        #[clap(short, long)]
        /// defaults to stdout
        output: Option<String>,
        #[clap(long)]
        pretty: bool,
    },
    /// Check that guard data has the minimum structure a worker needs
    Validate { in_file: String },
    /// Print a summary of guard data
    Info { in_file: String },
    /// Render the protected area to an image
    Render {
        in_file: String,
        out_file: String,
        #[clap(long)]
        /// render the packed painted map instead of the pixels
        painted_map: bool,
        #[clap(short, long, default_value = "1")]
        scale: u32,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            error!("{}", err);
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<ExitCode, CliError> {
    match command {
        Commands::Normalize {
            in_file,
            output,
            pretty,
        } => {
            let record = read_record(&in_file)?;
            let normalized = normalize(&record);
            let text = normalized.to_json(pretty)?;

            match output {
                Some(path) => fs::write(&path, text).map_err(|source| CliError::Write {
                    path: path.clone(),
                    source,
                })?,
                None => println!("{}", text),
            }

            if normalized.get("processed") == Some(&Value::Bool(false)) {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Validate { in_file } => {
            let record = read_record(&in_file)?;

            match validate(&record) {
                Ok(()) => println!("valid"),
                Err(err) => {
                    println!("invalid: {}", err);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Info { in_file } => {
            let record = read_record(&in_file)?;
            let summary = summarize(&record);

            // Guard stamps records with epoch milliseconds
            if let Summary::Info(digest) = &summary {
                let captured_at = digest
                    .timestamp
                    .as_i64()
                    .and_then(DateTime::<Utc>::from_timestamp_millis);
                if let Some(captured_at) = captured_at {
                    info!("Guard data captured at {}", captured_at);
                }
            }

            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Render {
            in_file,
            out_file,
            painted_map: use_painted_map,
            scale,
        } => {
            let record = read_record(&in_file)?;

            let canvas = if use_painted_map {
                let map = painted_map(&record)
                    .ok_or(CliError::NothingToRender("record has no usable painted map"))?;
                info!(
                    "Painted map {}x{}, {} painted",
                    map.width(),
                    map.height(),
                    map.painted_count()
                );
                render::render_painted_map(&map)
            } else {
                let normalized = normalize(&record);
                if normalized.get("processed") == Some(&Value::Bool(false)) {
                    let message = normalized
                        .get("processingError")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string();
                    return Err(CliError::NotProcessed(message));
                }
                render::render_pixels(&normalized)?
            };

            render::scale(canvas, scale)?.save(&out_file)?;
            info!("Saved {}", out_file);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn read_record(path: &str) -> Result<GuardRecord, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_string(),
        source,
    })?;

    GuardRecord::from_json(&text).map_err(|source| CliError::Parse {
        path: path.to_string(),
        source,
    })
}
