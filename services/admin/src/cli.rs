use crate::demo::{run_demo, run_export, DemoArgs, ExportArgs};
use clap::{Parser, Subcommand};
use jobboard::config::AppConfig;
use jobboard::error::AppError;
use jobboard::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "Job Board Admin",
    about = "Demonstrate and inspect job-board revision tracking from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run an end-to-end demo covering tracked saves, reverts, and recovery
    /// of deleted relations
    Demo(DemoArgs),
    /// Write the newsletter recipient CSV for a seeded demo board
    ExportSignups(ExportArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let command = cli
        .command
        .unwrap_or_else(|| Command::Demo(DemoArgs::default()));

    match command {
        Command::Demo(args) => run_demo(args, &config),
        Command::ExportSignups(args) => run_export(args, &config),
    }
}
