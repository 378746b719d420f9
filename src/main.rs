mod api;
mod catalog;
mod classify;
mod cli;
mod model;
mod orchestrator;
mod package;
mod poller;
mod text_mode;
mod transcript;
#[cfg(feature = "tui")]
mod tui;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let is_text = args.text;

    match cli::run(args).await {
        Ok(()) => {
            // Explicit exit code for scripted (non-TUI) usage.
            if is_text {
                std::process::exit(0);
            }
            Ok(())
        }
        Err(e) => {
            if is_text {
                eprintln!("{e:#}");
                std::process::exit(1);
            } else {
                Err(e)
            }
        }
    }
}
