mod render;
mod state;

use crate::api::BackendClient;
use crate::cli::{build_config, Cli};
use crate::model::AppEvent;
use crate::orchestrator::{self, UiCommand};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use state::{Focus, UiState};
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub async fn run(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    let client = BackendClient::new(&cfg)?;

    // Unbounded channels: commands are rare, events are small.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<AppEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    // The TUI runs on a dedicated thread so its blocking terminal I/O stays
    // out of the Tokio runtime; networking stays on the async side.
    let ui_args = args.clone();
    let ui_handle = std::thread::spawn(move || run_threaded(ui_args, event_rx, cmd_tx));

    let res = orchestrator::run_controller(&cfg, client, event_tx, cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Terminal loop on a dedicated thread. UiState is owned here exclusively.
fn run_threaded(
    args: Cli,
    mut event_rx: UnboundedReceiver<AppEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let mut state = UiState {
        device: args.device.clone(),
        goal: args.goal.clone(),
        mode: args.run_mode(),
        pending_scenario: args.scenario.clone(),
        ..Default::default()
    };
    if !args.package.is_empty() {
        state.package.apply_package(&args.package);
    }
    if let Some(i) = state.providers.iter().position(|p| *p == args.provider) {
        state.provider_index = i;
    } else {
        state.providers.insert(0, args.provider.clone());
        state.provider_index = 0;
    }
    if args.provider != "ollama" {
        // An explicit provider flag beats the backend's advertised default.
        state.provider_pinned = true;
    }

    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    let res = loop {
        // Drain controller events without blocking to keep the UI responsive.
        while let Ok(ev) = event_rx.try_recv() {
            state.apply_event(ev);
        }

        if last_tick.elapsed() >= tick_rate {
            terminal.draw(|f| render::draw(f.area(), f, &mut state)).ok();
            last_tick = Instant::now();
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                match (k.modifiers, k.code) {
                    (KeyModifiers::CONTROL, KeyCode::Char('c')) | (_, KeyCode::Esc) => {
                        let _ = cmd_tx.send(UiCommand::Quit);
                        break Ok(());
                    }
                    (_, KeyCode::Tab) => state.focus_next(),
                    (_, KeyCode::BackTab) => state.focus_prev(),
                    (_, KeyCode::F(5)) | (KeyModifiers::CONTROL, KeyCode::Char('r')) => {
                        trigger_run(&state, &cmd_tx);
                    }
                    (_, KeyCode::Enter) => {
                        if state.focus == Focus::Trigger {
                            trigger_run(&state, &cmd_tx);
                        } else {
                            state.focus_next();
                        }
                    }
                    (KeyModifiers::CONTROL, KeyCode::Char('y')) => copy_transcript(&mut state),
                    (_, KeyCode::Up) => select_prev(&mut state),
                    (_, KeyCode::Down) => select_next(&mut state),
                    (_, KeyCode::PageUp) => {
                        let (total, viewport) =
                            (state.transcript_total, state.transcript_viewport.max(1));
                        state.transcript.scroll_up(viewport / 2, total, viewport);
                    }
                    (_, KeyCode::PageDown) => {
                        let (total, viewport) =
                            (state.transcript_total, state.transcript_viewport.max(1));
                        state.transcript.scroll_down(viewport / 2, total, viewport);
                    }
                    (_, KeyCode::Backspace) => state.backspace(),
                    (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => {
                        state.push_char(c);
                    }
                    _ => {}
                }
            }
        }
    };

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    res
}

/// Inert while a run is active: the disabled trigger neither queues nor defers.
fn trigger_run(state: &UiState, cmd_tx: &UnboundedSender<UiCommand>) {
    if state.trigger_enabled() {
        let _ = cmd_tx.send(UiCommand::StartRun(Box::new(state.form())));
    }
}

fn select_prev(state: &mut UiState) {
    match state.focus {
        Focus::Package => state.package.select_prev(),
        Focus::Scenario => state.select_prev_scenario(),
        Focus::Provider => state.select_prev_provider(),
        Focus::Mode => state.toggle_mode(),
        _ => state.focus_prev(),
    }
}

fn select_next(state: &mut UiState) {
    match state.focus {
        Focus::Package => state.package.select_next(),
        Focus::Scenario => state.select_next_scenario(),
        Focus::Provider => state.select_next_provider(),
        Focus::Mode => state.toggle_mode(),
        _ => state.focus_next(),
    }
}

fn copy_transcript(state: &mut UiState) {
    let text = state.transcript.plain_text();
    match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text)) {
        Ok(()) => state.info = "Transcript copied to clipboard".into(),
        Err(e) => state.info = format!("Clipboard unavailable: {e}"),
    }
}
