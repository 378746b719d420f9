//! HTTP client for the orchestrator backend.

use crate::model::{ClientConfig, LivenessStatus, RunRequest, RunResult, Scenario};
use anyhow::{Context, Result};
use bytes::Bytes;
use serde::Deserialize;
use std::time::Duration;

/// `GET /api/status` body. `status` is informational and unused here.
#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    providers: Vec<String>,
    #[serde(rename = "default", default)]
    default_provider: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    probe_timeout: Duration,
}

impl BackendClient {
    pub fn new(cfg: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .build()
            .context("build HTTP client")?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            probe_timeout: Duration::from_millis(cfg.probe_timeout_ms),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Liveness probe. Any failure (network, non-2xx, malformed body) is an
    /// error; the caller maps it to the offline state.
    pub async fn fetch_status(&self) -> Result<LivenessStatus> {
        let resp = self
            .http
            .get(self.url("/api/status"))
            .timeout(self.probe_timeout)
            .send()
            .await
            .context("status probe")?
            .error_for_status()
            .context("status probe")?;
        let body: StatusResponse = resp.json().await.context("status body")?;
        Ok(LivenessStatus {
            online: true,
            providers: body.providers,
            default_provider: body.default_provider,
        })
    }

    pub async fn fetch_scenarios(&self) -> Result<Vec<Scenario>> {
        self.http
            .get(self.url("/api/scenarios"))
            .send()
            .await
            .context("fetch scenarios")?
            .error_for_status()
            .context("fetch scenarios")?
            .json()
            .await
            .context("parse scenarios")
    }

    /// Issue a run. Deliberately no timeout: runs are long and the only way
    /// out of a run is the backend's response or a transport error.
    pub async fn run_scenario(&self, request: &RunRequest) -> Result<RunResult> {
        self.http
            .post(self.url("/api/run-scenario"))
            .json(request)
            .send()
            .await
            .context("run request")?
            .error_for_status()
            .context("run request")?
            .json()
            .await
            .context("parse run result")
    }

    /// Fetch the latest device frame. `cache_buster` must be distinct per call
    /// so intermediaries never serve a stale frame.
    pub async fn fetch_screenshot(&self, cache_buster: u64) -> Result<Bytes> {
        self.http
            .get(format!(
                "{}?t={}",
                self.url("/screenshots/screenshot.png"),
                cache_buster
            ))
            .timeout(self.probe_timeout)
            .send()
            .await
            .context("fetch frame")?
            .error_for_status()
            .context("fetch frame")?
            .bytes()
            .await
            .context("read frame")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> (BackendClient, tempfile::TempDir) {
        // Per-test scratch dir so parallel tests never share a spool path.
        let dir = tempfile::tempdir().unwrap();
        let client = BackendClient::new(&ClientConfig {
            base_url: base.into(),
            status_interval: Duration::from_secs(10),
            frame_interval: Duration::from_secs(2),
            probe_timeout_ms: 200,
            frame_spool: dir.path().join("screenshot.png"),
            user_agent: "qapilot-test".into(),
        })
        .unwrap();
        (client, dir)
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let (c, _dir) = client("http://127.0.0.1:8000/");
        assert_eq!(c.url("/api/status"), "http://127.0.0.1:8000/api/status");
    }

    #[test]
    fn status_body_parses_default_provider() {
        let body: StatusResponse = serde_json::from_str(
            r#"{"status":"online","providers":["ollama","google"],"default":"ollama"}"#,
        )
        .unwrap();
        assert_eq!(body.providers, vec!["ollama", "google"]);
        assert_eq!(body.default_provider.as_deref(), Some("ollama"));
    }

    #[tokio::test]
    async fn unreachable_backend_reports_errors_not_panics() {
        // Port 9 (discard) is not listening in test environments.
        let (c, _dir) = client("http://127.0.0.1:9");
        assert!(c.fetch_status().await.is_err());
        assert!(c.fetch_scenarios().await.is_err());
        assert!(c.fetch_screenshot(1).await.is_err());
    }
}
