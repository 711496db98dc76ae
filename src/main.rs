use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

mod config;
mod extract;
mod ingest;
mod models;
mod report;
mod roster;

use config::PipelineConfig;
use models::{RosterMatrix, UnidentifiedEntry};

#[derive(Parser)]
#[command(name = "classwall-roster")]
#[command(about = "Submission roster builder for class social-wall exports", long_about = None)]
struct Cli {
    /// JSON file overriding the built-in classroom defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a digest of submissions per activity and per student
    Summary {
        #[arg(long)]
        input: PathBuf,
    },
    /// Export the roster matrix as CSV
    Export {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "roster.csv")]
        out: PathBuf,
        /// Also export posts with no activity number to this file
        #[arg(long)]
        unmatched_out: Option<PathBuf>,
    },
    /// List posts that could not be attributed to a numbered activity
    Unmatched {
        #[arg(long)]
        input: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };

    match cli.command {
        Commands::Summary { input } => {
            let (matrix, unmatched) = process_dataset(&input, &config)?;
            print!("{}", report::build_summary(&matrix, &unmatched));
        }
        Commands::Export {
            input,
            out,
            unmatched_out,
        } => {
            let (matrix, unmatched) = process_dataset(&input, &config)?;
            if matrix.rows.is_empty() {
                println!("No activity-identified submissions in this dataset.");
            }
            report::write_matrix_csv(&matrix, &out)?;
            println!("Roster written to {}.", out.display());

            if let Some(path) = unmatched_out {
                report::write_unidentified_csv(&unmatched, &path)?;
                println!("Unmatched posts written to {}.", path.display());
            }
        }
        Commands::Unmatched { input } => {
            let (_, unmatched) = process_dataset(&input, &config)?;
            if unmatched.is_empty() {
                println!("Every post names an activity.");
            }
            for entry in &unmatched {
                println!(
                    "- {} {} ({}): {} post(s)",
                    entry.first_name, entry.last_name, entry.group_label, entry.submission_count
                );
            }
        }
    }

    Ok(())
}

/// One full, stateless recomputation: raw file bytes in, tables out.
fn process_dataset(
    input: &Path,
    config: &PipelineConfig,
) -> anyhow::Result<(RosterMatrix, Vec<UnidentifiedEntry>)> {
    let raw = ingest::read_records(input, &config.columns)?;
    let extractor = extract::Extractor::new(config);
    let records: Vec<_> = raw.iter().filter_map(|r| extractor.extract(r)).collect();
    Ok(roster::reconcile(&records, config))
}
