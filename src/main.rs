//! Feishu relay - answers Feishu chat messages with DeepSeek completions.

use clap::Parser;
use std::process::ExitCode;

use feishu_relay::{logging, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    // Parse command line arguments
    let args = Commands::parse();

    let loaded = match args.settings() {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging; the guard flushes the log file on exit
    let _guard = match logging::init(&loaded.settings.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::FAILURE;
        }
    };
    loaded.log();

    // Run the command
    match args.run(&loaded.settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
