use crate::model::{ClientConfig, RunMode};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "qapilot",
    version,
    about = "Control client for an AI-driven mobile app test orchestrator"
)]
pub struct Cli {
    /// Base URL of the orchestrator backend
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    pub base_url: String,

    /// Device/emulator name to drive (e.g. emulator-5554)
    #[arg(long, default_value = "")]
    pub device: String,

    /// App package; empty lets the backend auto-discover it
    #[arg(long, default_value = "")]
    pub package: String,

    /// Test goal handed to the planner
    #[arg(long, default_value = "")]
    pub goal: String,

    /// LLM provider to request
    #[arg(long, default_value = "ollama")]
    pub provider: String,

    /// Execution mode: replay a scenario script or hand the goal to the AI planner
    #[arg(long, default_value = "dynamic", value_parser = ["fixed", "dynamic"])]
    pub mode: String,

    /// Pre-select a scenario by id (pre-fills package and goal)
    #[arg(long)]
    pub scenario: Option<String>,

    /// Run once with the flag-supplied inputs and print the transcript (no TUI)
    #[arg(long)]
    pub text: bool,

    /// Liveness probe period
    #[arg(long, default_value = "10s")]
    pub status_interval: humantime::Duration,

    /// Screenshot poll period while a run is active
    #[arg(long, default_value = "2s")]
    pub frame_interval: humantime::Duration,

    /// Timeout in milliseconds for status and screenshot requests
    #[arg(long, default_value_t = 5000)]
    pub probe_timeout_ms: u64,

    /// Where to spool the latest device frame (default: the user cache dir)
    #[arg(long)]
    pub frame_spool: Option<PathBuf>,
}

impl Cli {
    pub fn run_mode(&self) -> RunMode {
        match self.mode.as_str() {
            "fixed" => RunMode::Fixed,
            _ => RunMode::Dynamic,
        }
    }
}

pub fn build_config(args: &Cli) -> ClientConfig {
    let frame_spool = args.frame_spool.clone().unwrap_or_else(|| {
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("qapilot")
            .join("screenshot.png")
    });
    ClientConfig {
        base_url: args.base_url.trim_end_matches('/').to_string(),
        status_interval: args.status_interval.into(),
        frame_interval: args.frame_interval.into(),
        probe_timeout_ms: args.probe_timeout_ms,
        frame_spool,
        user_agent: format!("qapilot/{}", env!("CARGO_PKG_VERSION")),
    }
}

pub async fn run(args: Cli) -> Result<()> {
    if args.text {
        return crate::text_mode::run(&args).await;
    }

    #[cfg(feature = "tui")]
    {
        crate::tui::run(args).await
    }

    #[cfg(not(feature = "tui"))]
    {
        Err(anyhow::anyhow!(
            "built without the `tui` feature; use --text"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let args = Cli::parse_from(["qapilot"]);
        assert_eq!(args.base_url, "http://127.0.0.1:8000");
        assert_eq!(args.run_mode(), RunMode::Dynamic);
        let cfg = build_config(&args);
        assert_eq!(cfg.status_interval.as_secs(), 10);
        assert_eq!(cfg.frame_interval.as_secs(), 2);
        assert!(cfg.frame_spool.ends_with("qapilot/screenshot.png"));
    }

    #[test]
    fn mode_flag_maps_to_run_mode() {
        let args = Cli::parse_from(["qapilot", "--mode", "fixed"]);
        assert_eq!(args.run_mode(), RunMode::Fixed);
    }

    #[test]
    fn base_url_trailing_slash_is_stripped() {
        let args = Cli::parse_from(["qapilot", "--base-url", "http://host:8000/"]);
        assert_eq!(build_config(&args).base_url, "http://host:8000");
    }
}
