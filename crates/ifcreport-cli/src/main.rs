mod commands;
mod logging;
mod progress;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use chrono::Local;
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use ifcreport_core::{
    export, Error, ReportEngine, SearchConfig, SearchOutcome, SnapshotClient,
};
use indicatif::HumanBytes;
use progress::CliReporter;
use tracing::{error, info, warn};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match ifcreport_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    match args.command {
        Some(Commands::Search {
            snapshot,
            folder,
            roots,
        }) => {
            if let Err(err) = run_search(&snapshot, &folder, &roots, &config) {
                error!("Error: {}", err);
            }
        }
        Some(Commands::Report {
            snapshot,
            folder,
            roots,
            output,
        }) => {
            if let Err(err) = run_report(&snapshot, &folder, &roots, output, &config) {
                error!("Error: {}", err);
            }
        }
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:#?}", config);
        }
        None => {
            let _ = Cli::command().print_long_help();
        }
    }

    Ok(())
}

fn run_search(
    snapshot_path: &Path,
    folder: &str,
    roots: &[String],
    config: &SearchConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let (engine, roots) = open_engine(snapshot_path, roots, config)?;
    let reporter = CliReporter::new();

    match engine.search(&roots, folder, &reporter)? {
        SearchOutcome::NotFound => {
            println!("{}", format!("No folder named {:?} found", folder).yellow());
        }
        SearchOutcome::Found(found) => {
            println!();
            for (index, file) in found.files.iter().enumerate() {
                println!("{}. {}", index + 1, file.name.bold());
                println!("   ID: {} | Size: {}", file.id, HumanBytes(file.size));
                let path = file.path_string();
                println!(
                    "   Path: {}",
                    if path.is_empty() { "Root" } else { path.as_str() }
                );
            }
            println!();
            info!(
                "{} model files, {} folders visited in {}",
                format!("{}", found.files.len()).green(),
                found.folders_visited,
                format!("{:.2}s", found.duration.as_secs_f64()).green(),
            );
            report_skipped_folders(&found.skipped);
        }
    }

    Ok(())
}

fn run_report(
    snapshot_path: &Path,
    folder: &str,
    roots: &[String],
    output: Option<PathBuf>,
    config: &SearchConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let (engine, roots) = open_engine(snapshot_path, roots, config)?;
    let reporter = CliReporter::new();

    let found = match engine.search(&roots, folder, &reporter)? {
        SearchOutcome::NotFound => {
            println!("{}", format!("No folder named {:?} found", folder).yellow());
            return Ok(());
        }
        SearchOutcome::Found(found) => found,
    };
    report_skipped_folders(&found.skipped);

    let outcome = match engine.build_report(&found.files, &reporter) {
        Ok(outcome) => outcome,
        Err(Error::NoData) => {
            println!("{}", "No objects found to export".yellow());
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    let bytes = export::to_csv_bytes(&outcome.table)?;
    let path = output.unwrap_or_else(|| {
        PathBuf::from(export::report_file_name(
            &config.report_base_name,
            Local::now().date_naive(),
        ))
    });
    fs::write(&path, &bytes)?;

    println!();
    info!(
        "Wrote {} rows × {} columns to {}",
        format!("{}", outcome.table.row_count()).green(),
        format!("{}", outcome.table.columns.len()).green(),
        path.display().to_string().bold(),
    );
    info!(
        "Aggregate: {}, Assemble: {}",
        format!("{:.2}s", outcome.aggregate_duration.as_secs_f64()).green(),
        format!("{:.2}s", outcome.assemble_duration.as_secs_f64()).green(),
    );
    if !outcome.skipped.is_empty() {
        warn!(
            "{} files skipped:",
            format!("{}", outcome.skipped.len()).red()
        );
        for skip in &outcome.skipped {
            warn!("  {} — {}", skip.file.name, skip.error);
        }
    }
    if outcome.cancelled {
        warn!("Report was cancelled; the export contains partial data");
    }

    Ok(())
}

fn open_engine(
    snapshot_path: &Path,
    roots: &[String],
    config: &SearchConfig,
) -> Result<(ReportEngine<SnapshotClient>, Vec<String>), Box<dyn std::error::Error>> {
    let client = SnapshotClient::from_path(snapshot_path)?;
    let roots = if roots.is_empty() {
        client.roots().to_vec()
    } else {
        roots.to_vec()
    };
    Ok((ReportEngine::new(client, config.clone()), roots))
}

fn report_skipped_folders(skipped: &[ifcreport_core::model::SkippedFolder]) {
    if skipped.is_empty() {
        return;
    }
    warn!("{} subfolders skipped:", format!("{}", skipped.len()).red());
    for skip in skipped {
        warn!("  folder {} — {}", skip.folder_id, skip.error);
    }
}
