//! Slipstream CLI - Command-line interface
//!
//! Runs the source-resolution API server or resolves a single identity
//! from the command line.

mod commands;

use clap::Parser;
use slipstream_core::tracing_setup::{CliLogLevel, init_tracing};

#[derive(Parser)]
#[command(name = "slipstream")]
#[command(about = "Streaming source resolver with resilient playback")]
struct Cli {
    /// Console log level
    #[arg(long, default_value_t = CliLogLevel::Info)]
    log_level: CliLogLevel,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_tracing_level());

    if let Err(error) = commands::handle_command(cli.command).await {
        eprintln!("{}", error.user_message());
        std::process::exit(1);
    }
}
