//! UI state owned exclusively by the TUI thread. The controller task never
//! touches it; all updates arrive as `AppEvent`s.

use crate::classify::LogCategory;
use crate::model::{AppEvent, ExecutionState, FrameInfo, LivenessStatus, RunMode, Scenario};
use crate::orchestrator::RunForm;
use crate::package::PackageField;
use crate::transcript::Transcript;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Device,
    Package,
    Custom,
    Scenario,
    Goal,
    Provider,
    Mode,
    Trigger,
}

pub struct UiState {
    pub focus: Focus,
    pub device: String,
    pub package: PackageField,
    pub goal: String,
    pub providers: Vec<String>,
    pub provider_index: usize,
    /// Set once the user picks a provider; stops the backend's default from
    /// overriding their choice.
    pub provider_pinned: bool,
    pub mode: RunMode,
    pub scenarios: Vec<Scenario>,
    /// 0 = no scenario; i > 0 selects scenarios[i - 1].
    pub scenario_index: usize,
    /// Scenario id requested on the command line, applied once the catalog loads.
    pub pending_scenario: Option<String>,
    pub exec_state: ExecutionState,
    pub liveness: LivenessStatus,
    pub transcript: Transcript,
    pub last_frame: Option<FrameInfo>,
    pub info: String,
    // Geometry of the last transcript render, for scroll stepping.
    pub transcript_total: usize,
    pub transcript_viewport: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            focus: Focus::Device,
            device: String::new(),
            package: PackageField::new(),
            goal: String::new(),
            // Fallback list until the first successful liveness probe.
            providers: vec!["ollama".into(), "google".into()],
            provider_index: 0,
            provider_pinned: false,
            mode: RunMode::Dynamic,
            scenarios: Vec::new(),
            scenario_index: 0,
            pending_scenario: None,
            exec_state: ExecutionState::Idle,
            liveness: LivenessStatus::offline(),
            transcript: Transcript::new(),
            last_frame: None,
            info: String::new(),
            transcript_total: 0,
            transcript_viewport: 0,
        }
    }
}

impl UiState {
    pub fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::CatalogLoaded(scenarios) => {
                self.scenarios = scenarios;
                if let Some(id) = self.pending_scenario.take() {
                    if let Some(i) = self.scenarios.iter().position(|s| s.id == id) {
                        self.scenario_index = i + 1;
                        self.on_scenario_changed();
                    } else {
                        self.info = format!("Unknown scenario id: {id}");
                    }
                }
            }
            AppEvent::Liveness(status) => {
                if status.online && !status.providers.is_empty() {
                    let current = self.provider().to_string();
                    self.providers = status.providers.clone();
                    self.provider_index = self
                        .providers
                        .iter()
                        .position(|p| *p == current)
                        .unwrap_or(0);
                    if !self.provider_pinned {
                        if let Some(default) = &status.default_provider {
                            if let Some(i) = self.providers.iter().position(|p| p == default) {
                                self.provider_index = i;
                            }
                        }
                    }
                }
                self.liveness = status;
            }
            AppEvent::StateChanged(state) => self.exec_state = state,
            AppEvent::TranscriptCleared => self.transcript.clear(),
            AppEvent::Note { text, category } => self.transcript.append(text, category),
            AppEvent::Classified(lines) => self.transcript.append_classified(lines),
            AppEvent::Frame(frame) => self.last_frame = Some(frame),
            AppEvent::Info(message) => self.info = message,
        }
    }

    pub fn provider(&self) -> &str {
        self.providers
            .get(self.provider_index)
            .map(String::as_str)
            .unwrap_or("ollama")
    }

    pub fn selected_scenario(&self) -> Option<&Scenario> {
        if self.scenario_index == 0 {
            None
        } else {
            self.scenarios.get(self.scenario_index - 1)
        }
    }

    pub fn trigger_enabled(&self) -> bool {
        !self.exec_state.is_running()
    }

    pub fn form(&self) -> RunForm {
        RunForm {
            device: self.device.clone(),
            package: self.package.choice(),
            goal: self.goal.clone(),
            provider: self.provider().to_string(),
            mode: self.mode,
            scenario: self.selected_scenario().cloned(),
        }
    }

    // -- scenario selector --

    pub fn select_next_scenario(&mut self) {
        self.scenario_index = (self.scenario_index + 1) % (self.scenarios.len() + 1);
        self.on_scenario_changed();
    }

    pub fn select_prev_scenario(&mut self) {
        let slots = self.scenarios.len() + 1;
        self.scenario_index = (self.scenario_index + slots - 1) % slots;
        self.on_scenario_changed();
    }

    fn on_scenario_changed(&mut self) {
        if let Some(scenario) = self.selected_scenario().cloned() {
            self.package.apply_scenario(&scenario);
            self.goal = scenario.goal.clone();
            self.transcript.append(
                format!("📂 Scenario selected: {}", scenario.name),
                LogCategory::AiNote,
            );
        } else {
            self.package.reset();
            self.goal.clear();
        }
    }

    // -- provider / mode selectors --

    pub fn select_next_provider(&mut self) {
        if !self.providers.is_empty() {
            self.provider_index = (self.provider_index + 1) % self.providers.len();
            self.provider_pinned = true;
        }
    }

    pub fn select_prev_provider(&mut self) {
        if !self.providers.is_empty() {
            let n = self.providers.len();
            self.provider_index = (self.provider_index + n - 1) % n;
            self.provider_pinned = true;
        }
    }

    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
    }

    // -- focus & text editing --

    fn focus_order(&self) -> Vec<Focus> {
        let mut order = vec![Focus::Device, Focus::Package];
        if self.package.custom_visible() {
            order.push(Focus::Custom);
        }
        order.extend([
            Focus::Scenario,
            Focus::Goal,
            Focus::Provider,
            Focus::Mode,
            Focus::Trigger,
        ]);
        order
    }

    pub fn focus_next(&mut self) {
        let order = self.focus_order();
        let i = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = order[(i + 1) % order.len()];
    }

    pub fn focus_prev(&mut self) {
        let order = self.focus_order();
        let i = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = order[(i + order.len() - 1) % order.len()];
    }

    pub fn push_char(&mut self, c: char) {
        match self.focus {
            Focus::Device => self.device.push(c),
            Focus::Custom => self.package.push_custom_char(c),
            Focus::Goal => self.goal.push(c),
            _ => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            Focus::Device => {
                self.device.pop();
            }
            Focus::Custom => self.package.pop_custom_char(),
            Focus::Goal => {
                self.goal.pop();
            }
            _ => {}
        }
    }
}
