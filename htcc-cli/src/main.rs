//! htcc CLI - Command-line interface for HTCC hit clustering.
//!
//! Reads JSON Lines event files, clusters each event's hits and writes the
//! accepted clusters as CSV or binary records.
#![allow(
    clippy::uninlined_format_args,
    clippy::cast_precision_loss,
    clippy::too_many_lines
)]

use clap::{Parser, Subcommand};
use htcc_algorithms::{EventReconstructor, ReconstructionParameters};
use htcc_io::{ClusterFileWriter, EventFileReader, OutputFormat};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    HtccIo(#[from] htcc_io::Error),
}

/// Hit clustering for the CLAS12 High Threshold Cherenkov Counter.
#[derive(Parser)]
#[command(name = "htcc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output (debug logging unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cluster every event and write the cluster records
    Process {
        /// Input event file(s)
        #[arg(required = true)]
        input: Vec<PathBuf>,

        /// Output file path (.csv, .bin or .dat)
        #[arg(short, long)]
        output: PathBuf,

        /// Parameter file (JSON, angles in degrees)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show information about an event file
    Info {
        /// Input event file
        input: PathBuf,
    },

    /// Print the effective parameters as JSON
    Config {
        /// Parameter file to load instead of the defaults
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_parameters(config: Option<&Path>) -> Result<ReconstructionParameters> {
    match config {
        Some(path) => {
            debug!("loading parameters from {}", path.display());
            Ok(htcc_io::load_parameters(path)?)
        }
        None => Ok(ReconstructionParameters::default()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Process {
            input,
            output,
            config,
        } => {
            let params = load_parameters(config.as_deref())?;
            let format = OutputFormat::from_path(&output).unwrap_or_else(|| {
                warn!(
                    "Unknown extension for '{}', defaulting to binary",
                    output.display()
                );
                OutputFormat::Binary
            });

            info!("Processing {} file(s)...", input.len());
            info!("Writing output to: {}", output.display());

            let start = Instant::now();
            let mut reconstructor = EventReconstructor::new(params);
            let mut writer = ClusterFileWriter::create(&output)?;
            if format == OutputFormat::Csv {
                writer.write_clusters_csv(0, &[], true)?;
            }

            let mut total_events = 0usize;
            let mut total_clusters = 0usize;
            let mut bad_records = 0usize;
            let mut failed_events = 0usize;

            for path in &input {
                debug!("Reading: {}", path.display());
                let reader = EventFileReader::open(path)?;
                let mut file_events = 0usize;
                let mut file_clusters = 0usize;

                for event in reader.events() {
                    let event = match event {
                        Ok(event) => event,
                        Err(e) => {
                            warn!("{}: {}, skipping", path.display(), e);
                            bad_records += 1;
                            continue;
                        }
                    };
                    file_events += 1;

                    let records = match reconstructor.process(&event.hits) {
                        Ok(records) => records,
                        Err(e) => {
                            warn!("{}: event {}: {}", path.display(), event.event, e);
                            failed_events += 1;
                            continue;
                        }
                    };
                    writer.write_clusters(format, event.event, &records, false)?;
                    file_clusters += records.len();
                }

                debug!("  {} events, {} clusters", file_events, file_clusters);
                total_events += file_events;
                total_clusters += file_clusters;
            }
            writer.flush()?;

            let elapsed = start.elapsed();
            let stats = reconstructor.statistics();

            println!(
                "Processed {} files in {:.2}s",
                input.len(),
                elapsed.as_secs_f64()
            );
            println!("Total events: {}", total_events);
            println!("Total hits: {}", stats.hits_processed);
            println!("Total clusters: {}", total_clusters);
            println!("Rejected clusters: {}", stats.clusters_rejected);
            println!("Unclustered hits: {}", stats.hits_unclustered);
            if bad_records > 0 || failed_events > 0 {
                println!(
                    "Skipped {} malformed records, {} failed events",
                    bad_records, failed_events
                );
            }
        }

        Commands::Info { input } => {
            let reader = EventFileReader::open(&input)?;
            let file_size = reader.file_size();

            let mut events = 0usize;
            let mut bad_records = 0usize;
            let mut hits = 0usize;
            let mut nphe_range: Option<(i32, i32)> = None;
            let mut time_range: Option<(f64, f64)> = None;

            for event in reader.events() {
                let Ok(event) = event else {
                    bad_records += 1;
                    continue;
                };
                events += 1;
                hits += event.hits.len();
                for &nphe in &event.hits.nphe {
                    nphe_range = Some(nphe_range.map_or((nphe, nphe), |(lo, hi)| {
                        (lo.min(nphe), hi.max(nphe))
                    }));
                }
                for &time in &event.hits.time {
                    time_range = Some(time_range.map_or((time, time), |(lo, hi)| {
                        (lo.min(time), hi.max(time))
                    }));
                }
            }

            println!("File: {}", input.display());
            println!(
                "Size: {} bytes ({:.2} MB)",
                file_size,
                file_size as f64 / 1_000_000.0
            );
            println!("Events: {}", events);
            if bad_records > 0 {
                println!("Malformed records: {}", bad_records);
            }
            println!("Hits: {}", hits);
            if let Some((lo, hi)) = nphe_range {
                println!("nphe range: {} - {}", lo, hi);
            }
            if let Some((lo, hi)) = time_range {
                println!("Time range: {} - {}", lo, hi);
            }
        }

        Commands::Config { config } => {
            let params = load_parameters(config.as_deref())?;
            println!("{}", htcc_io::parameters_to_json(&params)?);
        }
    }

    Ok(())
}
