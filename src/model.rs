use crate::classify::{LogCategory, StyledLine};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Scenario steps are an opaque backend contract; the client passes them
/// through untouched (the executor accepts plain strings or structured records).
pub type Step = serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    #[serde(with = "humantime_serde")]
    pub status_interval: Duration,
    #[serde(with = "humantime_serde")]
    pub frame_interval: Duration,
    pub probe_timeout_ms: u64,
    pub frame_spool: PathBuf,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Fixed,
    Dynamic,
}

impl RunMode {
    pub fn as_str(self) -> &'static str {
        match self {
            RunMode::Fixed => "fixed",
            RunMode::Dynamic => "dynamic",
        }
    }

    /// Label used for the transcript banner and the mode selector.
    pub fn describe(self) -> &'static str {
        match self {
            RunMode::Fixed => "FIXED SCRIPT 📜",
            RunMode::Dynamic => "DYNAMIC AI 🧠",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            RunMode::Fixed => RunMode::Dynamic,
            RunMode::Dynamic => RunMode::Fixed,
        }
    }
}

/// Body of `POST /api/run-scenario`. Field names are the wire contract.
#[derive(Debug, Clone, Serialize)]
pub struct RunRequest {
    pub device: String,
    pub package: String,
    pub goal: String,
    pub provider: String,
    pub mode: RunMode,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunResult {
    pub plan: String,
    pub log: String,
    pub analysis: String,
    // Echoed back by the backend on some routes; not required.
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
}

/// Lifecycle of a single run. Exactly one instance lives in the run driver;
/// the UI only ever reads it via `AppEvent::StateChanged`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Idle,
    Running,
    Done,
    Error,
}

impl ExecutionState {
    pub fn is_running(self) -> bool {
        matches!(self, ExecutionState::Running)
    }

    pub fn label(self) -> &'static str {
        match self {
            ExecutionState::Idle => "IDLE",
            ExecutionState::Running => "RUNNING",
            ExecutionState::Done => "DONE",
            ExecutionState::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LivenessStatus {
    pub online: bool,
    pub providers: Vec<String>,
    pub default_provider: Option<String>,
}

impl LivenessStatus {
    pub fn offline() -> Self {
        Self {
            online: false,
            providers: Vec::new(),
            default_provider: None,
        }
    }

    /// Status-bar indicator text, matching the executor's dashboard wording.
    pub fn indicator(&self) -> String {
        if self.online {
            format!("AI: {}", self.providers.join(" / ").to_uppercase())
        } else {
            "LLM: OFFLINE".to_string()
        }
    }
}

/// Metadata for the latest device frame written to the spool file.
#[derive(Debug, Clone)]
pub struct FrameInfo {
    pub seq: u64,
    pub bytes: u64,
    pub at: String,
    pub path: PathBuf,
}

/// Events emitted by the controller task and consumed by presentation layers.
#[derive(Debug, Clone)]
pub enum AppEvent {
    CatalogLoaded(Vec<Scenario>),
    Liveness(LivenessStatus),
    StateChanged(ExecutionState),
    TranscriptCleared,
    /// Escaping text path: inserted verbatim as a single styled entry.
    Note { text: String, category: LogCategory },
    /// Markup path: pre-classified output of the log classifier only.
    Classified(Vec<StyledLine>),
    Frame(FrameInfo),
    /// Diagnostics and validation alerts for the status line, never the transcript.
    Info(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&RunMode::Fixed).unwrap(), "\"fixed\"");
        assert_eq!(
            serde_json::to_string(&RunMode::Dynamic).unwrap(),
            "\"dynamic\""
        );
    }

    #[test]
    fn scenario_tolerates_missing_optional_fields() {
        let s: Scenario = serde_json::from_str(r#"{"id":"s1","name":"Login flow"}"#).unwrap();
        assert_eq!(s.id, "s1");
        assert!(s.package.is_empty());
        assert!(s.goal.is_empty());
        assert!(s.steps.is_empty());
    }

    #[test]
    fn run_result_ignores_unknown_and_defaults_echoes() {
        let r: RunResult =
            serde_json::from_str(r#"{"plan":"P1","log":"l","analysis":"a","extra":1}"#).unwrap();
        assert_eq!(r.plan, "P1");
        assert!(r.package.is_none());
        assert!(r.mode.is_none());
    }

    #[test]
    fn liveness_indicator_joins_and_uppercases() {
        let s = LivenessStatus {
            online: true,
            providers: vec!["ollama".into(), "google".into()],
            default_provider: Some("ollama".into()),
        };
        assert_eq!(s.indicator(), "AI: OLLAMA / GOOGLE");
        assert_eq!(LivenessStatus::offline().indicator(), "LLM: OFFLINE");
    }
}
