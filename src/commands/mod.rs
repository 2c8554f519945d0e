pub mod report;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Render a report from a dataset file without starting the server
    Report(report::ReportArgs),
}

pub async fn handle_command(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Report(args) => report::handle_report_command(args),
    }
}
