use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, warn};

use depot_locator::cli::cli::{Args, ExportFormat};
use depot_locator::config::locator_config::LocatorConfig;
use depot_locator::core::commands::CommandOutput;
use depot_locator::utils::export;
use depot_locator::utils::logging::{self, FileIOType, OperationCategory};
use depot_locator::{LocatorError, Session};

fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_logging(args.enable_timing(), args.debug_logging());

    println!("Depot Locator");
    println!("Input: {}", args.input().display());

    let config = load_config(&args)?;
    let mut session = Session::new(config);

    match session.load(args.input()) {
        Ok(()) => {}
        Err(LocatorError::Io(e)) => {
            // unreadable file: say so plainly and let the user pick another
            error!("Could not read {}: {}", args.input().display(), e);
            eprintln!("Could not read {}: {}. Check the path and try again.", args.input().display(), e);
            std::process::exit(2);
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to load polygon from {}", args.input().display()));
        }
    }

    let mut outputs = Vec::new();
    for command in args.commands() {
        match session.execute(command) {
            Ok(output) => {
                print!("{}", output);
                outputs.push(output);
            }
            // one failing command must not stop the others
            Err(e) => {
                warn!("{} failed: {}", command, e);
                eprintln!("{} failed: {}", command, e);
            }
        }
    }

    if let Some(dir) = args.output_dir() {
        export_results(dir, args.format(), &outputs)?;
    }

    logging::print_timing_report();
    Ok(())
}

fn load_config(args: &Args) -> Result<LocatorConfig> {
    let _timing = logging::start_timing("load_config",
        OperationCategory::FileIO { subcategory: FileIOType::ConfigLoad });

    let base = match args.config_path() {
        Some(path) => LocatorConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => LocatorConfig::default(),
    };
    let config = args.apply_overrides(base);
    config.validate().context("Invalid command-line settings")?;
    Ok(config)
}

fn export_results(dir: &std::path::Path, format: ExportFormat, outputs: &[CommandOutput]) -> Result<()> {
    match format {
        ExportFormat::Csv => {
            let points = export::timestamped_path(dir, "points", "csv")?;
            export::export_points_csv(&points, outputs)?;
            println!("Points written to {}", points.display());

            if outputs.iter().any(|o| !o.edges.is_empty()) {
                let edges = export::timestamped_path(dir, "edges", "csv")?;
                export::export_edges_csv(&edges, outputs)?;
                println!("Edges written to {}", edges.display());
            }
        }
        ExportFormat::Geojson => {
            let path = export::timestamped_path(dir, "results", "geojson")?;
            export::export_geojson(&path, outputs)?;
            println!("Results written to {}", path.display());
        }
    }
    Ok(())
}
