//! Headless one-shot mode: run once with flag-supplied inputs and print the
//! transcript to stdout. Diagnostics go to stderr.

use crate::api::BackendClient;
use crate::catalog::ScenarioCatalog;
use crate::cli::{build_config, Cli};
use crate::model::{AppEvent, ExecutionState};
use crate::orchestrator::{RunDriver, RunForm};
use crate::package::PackageField;
use crate::poller::ScreenshotPoller;
use crate::transcript::Transcript;
use anyhow::{bail, Result};
use tokio::sync::mpsc;

pub async fn run(args: &Cli) -> Result<()> {
    let cfg = build_config(args);
    let client = BackendClient::new(&cfg)?;

    let catalog = if args.scenario.is_some() {
        match ScenarioCatalog::fetch(&client).await {
            Ok(catalog) => catalog,
            Err(e) => {
                eprintln!("scenario catalog unavailable: {e:#}");
                ScenarioCatalog::empty()
            }
        }
    } else {
        ScenarioCatalog::empty()
    };

    let scenario = args
        .scenario
        .as_deref()
        .and_then(|id| catalog.find_by_id(id))
        .cloned();

    // Same pre-fill rules as the interactive form: a selected scenario
    // supplies package and goal unless the flags override them.
    let mut package = PackageField::new();
    if !args.package.is_empty() {
        package.apply_package(&args.package);
    } else if let Some(s) = &scenario {
        package.apply_scenario(s);
    }
    let goal = if args.goal.is_empty() {
        scenario.as_ref().map(|s| s.goal.clone()).unwrap_or_default()
    } else {
        args.goal.clone()
    };

    let form = RunForm {
        device: args.device.clone(),
        package: package.choice(),
        goal,
        provider: args.provider.clone(),
        mode: args.run_mode(),
        scenario,
    };

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let poller = ScreenshotPoller::new(
        client.clone(),
        cfg.frame_interval,
        cfg.frame_spool.clone(),
        event_tx.clone(),
    );
    let mut driver = RunDriver::new(poller, event_tx);

    let Some(request) = driver.start(&form) else {
        while let Ok(ev) = event_rx.try_recv() {
            if let AppEvent::Info(msg) = ev {
                eprintln!("{msg}");
            }
        }
        bail!("missing required inputs");
    };

    let outcome = client.run_scenario(&request).await;
    driver.finish(outcome);

    let mut transcript = Transcript::new();
    while let Ok(ev) = event_rx.try_recv() {
        match ev {
            AppEvent::TranscriptCleared => transcript.clear(),
            AppEvent::Note { text, category } => transcript.append(text, category),
            AppEvent::Classified(lines) => transcript.append_classified(lines),
            AppEvent::Info(msg) => eprintln!("{msg}"),
            _ => {}
        }
    }
    println!("{}", transcript.plain_text());

    if driver.state() == ExecutionState::Error {
        bail!("run failed");
    }
    Ok(())
}
