//! Run lifecycle controller.
//!
//! `RunDriver` is the state machine for a single run: it validates the form,
//! emits the opening transcript lines, couples the screenshot poller to the
//! RUNNING state, and renders the outcome. `run_controller` is the async loop
//! that wires it to the backend and to the UI command channel.

use crate::api::BackendClient;
use crate::catalog::ScenarioCatalog;
use crate::classify::{classify, LogCategory};
use crate::model::{
    AppEvent, ClientConfig, ExecutionState, RunMode, RunRequest, RunResult, Scenario,
};
use crate::package::PackageChoice;
use crate::poller::{heartbeat_loop, ScreenshotPoller};
use anyhow::Result;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

/// Commands emitted by presentation layers.
#[derive(Debug, Clone)]
pub(crate) enum UiCommand {
    StartRun(Box<RunForm>),
    Quit,
}

/// Raw form inputs captured at trigger time. Validation and package
/// resolution happen in the driver, not at capture time.
#[derive(Debug, Clone)]
pub(crate) struct RunForm {
    pub device: String,
    pub package: PackageChoice,
    pub goal: String,
    pub provider: String,
    pub mode: RunMode,
    pub scenario: Option<Scenario>,
}

/// Build the wire request. Steps are forwarded only for a fixed-mode run with
/// a selected scenario; every other combination sends an empty script.
pub(crate) fn build_run_request(form: &RunForm) -> RunRequest {
    let steps = match (form.mode, &form.scenario) {
        (RunMode::Fixed, Some(scenario)) => scenario.steps.clone(),
        _ => Vec::new(),
    };
    RunRequest {
        device: form.device.trim().to_string(),
        package: form.package.resolve(),
        goal: form.goal.trim().to_string(),
        provider: form.provider.clone(),
        mode: form.mode,
        steps,
    }
}

pub(crate) struct RunDriver {
    state: ExecutionState,
    poller: ScreenshotPoller,
    event_tx: UnboundedSender<AppEvent>,
}

impl RunDriver {
    pub fn new(poller: ScreenshotPoller, event_tx: UnboundedSender<AppEvent>) -> Self {
        Self {
            state: ExecutionState::Idle,
            poller,
            event_tx,
        }
    }

    pub fn state(&self) -> ExecutionState {
        self.state
    }

    pub fn poller_active(&self) -> bool {
        self.poller.is_active()
    }

    fn send(&self, event: AppEvent) {
        let _ = self.event_tx.send(event);
    }

    fn classified(&self, raw: &str) {
        self.send(AppEvent::Classified(classify(raw)));
    }

    fn set_state(&mut self, state: ExecutionState) {
        self.state = state;
        self.send(AppEvent::StateChanged(state));
    }

    /// Begin a run: validate, clear the transcript, announce the inputs,
    /// enter RUNNING with the poller started, and hand back the request to
    /// issue. `None` means validation failed and nothing changed.
    pub fn start(&mut self, form: &RunForm) -> Option<RunRequest> {
        if form.goal.trim().is_empty() {
            self.send(AppEvent::Info("Enter the test goal.".into()));
            return None;
        }
        if form.device.trim().is_empty() {
            self.send(AppEvent::Info("Enter the device/emulator name.".into()));
            return None;
        }

        let request = build_run_request(form);

        self.send(AppEvent::TranscriptCleared);
        self.classified(&format!("⏳ Mode: {}", form.mode.describe()));
        self.classified(&format!("📱 Device: {}", request.device));
        let shown = if request.package.is_empty() {
            "Auto"
        } else {
            request.package.as_str()
        };
        self.classified(&format!("🎯 App: {shown}"));

        // Entering RUNNING and starting the poller is one step; the two must
        // never be observable apart.
        self.poller.start();
        self.set_state(ExecutionState::Running);

        Some(request)
    }

    /// Settle the run. Both arms end with the poller stopped; this is the
    /// only exit from RUNNING.
    pub fn finish(&mut self, outcome: Result<RunResult>) {
        match outcome {
            Ok(result) => {
                self.classified(&format!("\n--- EXECUTION LOG ({}) ---", result.plan));
                self.classified(&result.log);
                self.send(AppEvent::Note {
                    text: "\n--- FINAL ANALYSIS ---".into(),
                    category: LogCategory::AiNote,
                });
                self.classified(&result.analysis);
                self.set_state(ExecutionState::Done);
            }
            Err(e) => {
                self.send(AppEvent::Note {
                    text: format!("\n❌ Critical error: {e:#}"),
                    category: LogCategory::Error,
                });
                self.set_state(ExecutionState::Error);
            }
        }
        self.poller.stop();
    }

    pub fn shutdown(&mut self) {
        self.poller.stop();
    }
}

/// Controller task: loads the catalog once, keeps the heartbeat alive, and
/// serializes runs. A second StartRun while a run task is outstanding is
/// dropped (the UI also disables the trigger while RUNNING).
pub(crate) async fn run_controller(
    cfg: &ClientConfig,
    client: BackendClient,
    event_tx: UnboundedSender<AppEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    match ScenarioCatalog::fetch(&client).await {
        Ok(catalog) => {
            let _ = event_tx.send(AppEvent::CatalogLoaded(catalog.scenarios().to_vec()));
        }
        Err(e) => {
            // Degrade to manual entry; this never reaches the transcript.
            let _ = event_tx.send(AppEvent::Info(format!("Scenario catalog unavailable: {e:#}")));
        }
    }

    let heartbeat = tokio::spawn(heartbeat_loop(
        client.clone(),
        cfg.status_interval,
        event_tx.clone(),
    ));

    let poller = ScreenshotPoller::new(
        client.clone(),
        cfg.frame_interval,
        cfg.frame_spool.clone(),
        event_tx.clone(),
    );
    let mut driver = RunDriver::new(poller, event_tx.clone());
    let mut run_handle: Option<JoinHandle<Result<RunResult>>> = None;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UiCommand::StartRun(form)) => {
                        if run_handle.is_none() {
                            if let Some(request) = driver.start(&form) {
                                let client = client.clone();
                                run_handle = Some(tokio::spawn(async move {
                                    client.run_scenario(&request).await
                                }));
                            }
                        }
                    }
                    Some(UiCommand::Quit) | None => break,
                }
            }
            // Keep the JoinHandle in place until this branch wins; taking it
            // earlier would drop it when another branch is chosen and the
            // completion would never be observed.
            maybe_done = async {
                if let Some(handle) = run_handle.as_mut() {
                    return Some(handle.await);
                }
                futures::future::pending().await
            } => {
                if let Some(join_res) = maybe_done {
                    run_handle = None;
                    let outcome = match join_res {
                        Ok(res) => res,
                        Err(e) => Err(anyhow::anyhow!("run task failed: {e}")),
                    };
                    driver.finish(outcome);
                }
            }
        }
    }

    // An in-flight run is abandoned, not cancelled; only the poller and the
    // heartbeat are torn down.
    heartbeat.abort();
    driver.shutdown();
    Ok(())
}
