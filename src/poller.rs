//! Recurring background probes: the backend heartbeat and the device-frame
//! poller. Both are plain tokio interval loops reporting through `AppEvent`.

use crate::api::BackendClient;
use crate::model::{AppEvent, FrameInfo, LivenessStatus};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Probe backend liveness forever: once immediately, then every `period`.
/// Each cycle recovers independently; a failed probe only flips the indicator
/// offline until the next success.
pub async fn heartbeat_loop(
    client: BackendClient,
    period: Duration,
    event_tx: UnboundedSender<AppEvent>,
) {
    let mut ticker = tokio::time::interval(period);
    loop {
        ticker.tick().await;
        let status = client
            .fetch_status()
            .await
            .unwrap_or_else(|_| LivenessStatus::offline());
        if event_tx.send(AppEvent::Liveness(status)).is_err() {
            break;
        }
    }
}

/// Repeated fetch of the latest device frame, active only while a run is in
/// flight. The run driver starts it on entry to RUNNING and stops it on every
/// exit; `Drop` stops it as a last resort.
pub struct ScreenshotPoller {
    client: BackendClient,
    period: Duration,
    spool: PathBuf,
    event_tx: UnboundedSender<AppEvent>,
    handle: Option<JoinHandle<()>>,
}

impl ScreenshotPoller {
    pub fn new(
        client: BackendClient,
        period: Duration,
        spool: PathBuf,
        event_tx: UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            client,
            period,
            spool,
            event_tx,
            handle: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Begin polling. No-op when already active.
    pub fn start(&mut self) {
        if self.is_active() {
            return;
        }
        let client = self.client.clone();
        let period = self.period;
        let spool = self.spool.clone();
        let event_tx = self.event_tx.clone();
        self.handle = Some(tokio::spawn(async move {
            if let Some(dir) = spool.parent() {
                let _ = std::fs::create_dir_all(dir);
            }
            let mut ticker = tokio::time::interval(period);
            let mut last_buster = 0u64;
            let mut seq = 0u64;
            loop {
                ticker.tick().await;
                let buster = next_cache_buster(&mut last_buster);
                // A missed frame is not an error; the next tick re-requests.
                let Ok(frame) = client.fetch_screenshot(buster).await else {
                    continue;
                };
                if std::fs::write(&spool, &frame).is_err() {
                    continue;
                }
                seq += 1;
                let info = FrameInfo {
                    seq,
                    bytes: frame.len() as u64,
                    at: now_rfc3339(),
                    path: spool.clone(),
                };
                if event_tx.send(AppEvent::Frame(info)).is_err() {
                    break;
                }
            }
        }));
    }

    /// Cancel the recurring fetch immediately. Idempotent.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for ScreenshotPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Strictly increasing cache buster, based on wall-clock milliseconds. Two
/// calls in the same millisecond still produce distinct values.
fn next_cache_buster(prev: &mut u64) -> u64 {
    let now_ms = (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as u64;
    *prev = now_ms.max(*prev + 1);
    *prev
}

fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "now".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ClientConfig;
    use tokio::sync::mpsc;

    fn test_poller() -> (
        ScreenshotPoller,
        mpsc::UnboundedReceiver<AppEvent>,
        tempfile::TempDir,
    ) {
        // Per-test scratch dir so parallel tests never share a spool path.
        let dir = tempfile::tempdir().unwrap();
        let cfg = ClientConfig {
            base_url: "http://127.0.0.1:9".into(),
            status_interval: Duration::from_secs(10),
            frame_interval: Duration::from_millis(50),
            probe_timeout_ms: 100,
            frame_spool: dir.path().join("screenshot.png"),
            user_agent: "qapilot-test".into(),
        };
        let client = BackendClient::new(&cfg).unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        (
            ScreenshotPoller::new(client, cfg.frame_interval, cfg.frame_spool, tx),
            rx,
            dir,
        )
    }

    #[tokio::test]
    async fn start_and_stop_track_activity() {
        let (mut poller, _rx, _dir) = test_poller();
        assert!(!poller.is_active());
        poller.start();
        assert!(poller.is_active());
        poller.stop();
        assert!(!poller.is_active());
    }

    #[tokio::test]
    async fn stop_is_idempotent_and_start_while_active_is_noop() {
        let (mut poller, _rx, _dir) = test_poller();
        poller.stop();
        assert!(!poller.is_active());
        poller.start();
        poller.start();
        assert!(poller.is_active());
        poller.stop();
        poller.stop();
        assert!(!poller.is_active());
    }

    #[test]
    fn cache_buster_is_strictly_increasing() {
        let mut prev = 0u64;
        let a = next_cache_buster(&mut prev);
        let b = next_cache_buster(&mut prev);
        let c = next_cache_buster(&mut prev);
        assert!(a < b && b < c);
    }
}
