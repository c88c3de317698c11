//! Golem - Slack workspace bot with canned replies and repository commands.

use clap::Parser;
use std::process::ExitCode;

use golem::{logging, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    // Parse command line arguments
    let args = Commands::parse();

    // The daemon logs to file as well; the guard must outlive the run
    let _guard = if args.is_daemon() {
        match logging::init() {
            Ok((guard, _)) => Some(guard),
            Err(e) => {
                eprintln!("Failed to initialize logging: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        logging::init_console();
        None
    };

    // Run the command
    match args.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
