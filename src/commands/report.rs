use crate::analytics::{Dataset, ReportGenerator, ReportKind, StatisticsService};
use clap::Args;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Report to generate
    #[arg(short, long, value_enum)]
    pub kind: ReportKind,

    /// JSON file holding `demands`, `resources`, `users` and optionally `matches`
    #[arg(short, long)]
    pub input: PathBuf,

    /// Report title; defaults to the report kind's standard title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ReportCommandError {
    #[error("Failed to read dataset {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid dataset {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to export report to {}", .0.display())]
    Export(PathBuf),
    #[error("Failed to write report: {0}")]
    Output(#[from] std::io::Error),
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub fn load_dataset(path: &Path) -> Result<Dataset, ReportCommandError> {
    let contents = fs::read_to_string(path).map_err(|source| ReportCommandError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ReportCommandError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn handle_report_command(args: ReportArgs) -> Result<(), Box<dyn std::error::Error>> {
    run_report(&args, &mut std::io::stdout())?;
    Ok(())
}

/// Generate the requested report and write it to `--output` or `out`
pub fn run_report<W: Write>(args: &ReportArgs, out: &mut W) -> Result<(), ReportCommandError> {
    let dataset = load_dataset(&args.input)?;
    let generator = ReportGenerator::new(StatisticsService::new());
    let report = generator.generate(args.kind, &dataset, args.title.as_deref());

    match &args.output {
        Some(path) => {
            if !generator.export_to_json(&report, path) {
                return Err(ReportCommandError::Export(path.clone()));
            }
            info!(
                kind = %args.kind,
                title = report.title(),
                path = %path.display(),
                "Report written"
            );
        }
        None => {
            serde_json::to_writer_pretty(&mut *out, &report)?;
            writeln!(out)?;
        }
    }

    Ok(())
}
