//! Command-line interface for inspecting Modbus register mapping files.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use regmap_core::{list_mapping_files, load_mapping, Entity, Mapping};

/// Validate and inspect Modbus register mapping files.
#[derive(Parser, Debug)]
#[command(name = "regmap")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Action to perform.
    #[command(subcommand)]
    command: Command,

    /// Verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Validate one or more mapping files.
    Validate {
        /// Mapping files to validate.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List mapping files in a directory.
    List {
        /// Directory to scan.
        dir: PathBuf,
    },
    /// Show the resolved device and entity table of a mapping file.
    Show {
        /// Mapping file to show.
        file: PathBuf,
        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(if args.verbose { "debug" } else { "warn" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    match run(args.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<bool> {
    match command {
        Command::Validate { files } => {
            let mut ok = true;
            for path in &files {
                match load_mapping(path) {
                    Ok(mapping) => {
                        println!(
                            "{}: OK ({}, {} entities)",
                            path.display(),
                            mapping.device.name,
                            mapping.entities.len()
                        );
                    }
                    Err(err) => {
                        ok = false;
                        eprintln!("{}", err);
                    }
                }
            }
            Ok(ok)
        }
        Command::List { dir } => {
            for file in list_mapping_files(&dir) {
                println!("{}", file);
            }
            Ok(true)
        }
        Command::Show { file, json } => {
            let mapping = load_mapping(&file)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&mapping)?);
            } else {
                print_mapping(&mapping);
            }
            Ok(true)
        }
    }
}

fn print_mapping(mapping: &Mapping) {
    println!("device: {}", mapping.device.name);
    if let Some(manufacturer) = &mapping.device.manufacturer {
        println!("manufacturer: {}", manufacturer);
    }
    if let Some(model) = &mapping.device.model {
        println!("model: {}", model);
    }
    println!();
    println!(
        "{:<14} {:<24} {:<10} {:<10} entity",
        "platform", "key", "read", "write"
    );
    for entity in &mapping.entities {
        println!(
            "{:<14} {:<24} {:<10} {:<10} {}",
            entity.platform.to_string(),
            entity.key,
            describe_read(entity),
            describe_write(entity),
            entity.display_name(),
        );
    }
}

fn describe_read(entity: &Entity) -> String {
    match &entity.read {
        Some(read) => match read.bit {
            Some(bit) => format!("{}#{}", read.address, bit),
            None => format!("{}/{}", read.address, read.data_type),
        },
        None => "-".to_string(),
    }
}

fn describe_write(entity: &Entity) -> String {
    match &entity.write {
        Some(write) => match write.bit {
            Some(bit) => format!("{}#{}", write.address, bit),
            None => format!("{}", write.address),
        },
        None => "-".to_string(),
    }
}
