//! Refresh coordinator.
//!
//! Single authority for the latest dashboard snapshot and for whether a
//! fetch should happen now. Triggers arrive from everywhere — mount,
//! push events, the periodic fallback timer, the manual refresh button —
//! and the cooldown collapses bursts of them into at most one fetch per
//! window. State is published through a `watch` channel, so readers
//! always see a whole snapshot, old or new, never a mix.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::api::FetchDashboard;
use crate::models::DashboardResponse;

/// Default minimum time between the start of successive non-bypassing
/// fetches.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(1000);

/// Fetch state machine position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    Idle,
    Fetching,
    /// Last fetch failed; cleared by the next successful fetch.
    Errored,
}

/// What a `request_refresh` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A fetch ran and replaced the snapshot.
    Completed,
    /// A fetch ran and failed; the previous snapshot is preserved.
    Failed,
    /// Dropped by the cooldown; no fetch started.
    Skipped,
}

/// Published dashboard data state.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    /// Last known-good snapshot. Survives fetch failures.
    pub snapshot: Option<Arc<DashboardResponse>>,
    pub status: FetchStatus,
    /// Human-readable message from the last failed fetch.
    pub error_message: Option<String>,
}

impl DashboardState {
    /// Whether a fetch is currently in flight.
    pub fn is_loading(&self) -> bool {
        self.status == FetchStatus::Fetching
    }
}

/// Coalesces refresh triggers into a bounded rate of actual fetches.
///
/// Lives on the session's coordinating task; fetches run inline, so at
/// most one is in flight at a time.
pub struct RefreshCoordinator<F> {
    fetcher: F,
    project_id: String,
    cooldown: Duration,
    last_started: Option<Instant>,
    tx: watch::Sender<DashboardState>,
}

impl<F: FetchDashboard> RefreshCoordinator<F> {
    /// Create a coordinator with the default cooldown.
    pub fn new(fetcher: F, project_id: impl Into<String>) -> Self {
        Self::with_cooldown(fetcher, project_id, DEFAULT_COOLDOWN)
    }

    /// Create a coordinator with an explicit cooldown window.
    pub fn with_cooldown(fetcher: F, project_id: impl Into<String>, cooldown: Duration) -> Self {
        let (tx, _rx) = watch::channel(DashboardState::default());
        Self {
            fetcher,
            project_id: project_id.into(),
            cooldown,
            last_started: None,
            tx,
        }
    }

    /// Subscribe to published dashboard state.
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.tx.subscribe()
    }

    /// Request a snapshot refresh.
    ///
    /// Non-bypassing requests are dropped while the time since the last
    /// *started* fetch is strictly less than the cooldown; a request
    /// landing exactly on the boundary is allowed. Bypassing requests
    /// always fetch and reset the cooldown clock.
    pub async fn request_refresh(&mut self, bypass_cooldown: bool) -> RefreshOutcome {
        let now = Instant::now();
        if !bypass_cooldown {
            if let Some(started) = self.last_started {
                let elapsed = now.duration_since(started);
                if elapsed < self.cooldown {
                    debug!(
                        project_id = %self.project_id,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "refresh dropped by cooldown"
                    );
                    return RefreshOutcome::Skipped;
                }
            }
        }

        self.last_started = Some(now);
        self.tx.send_modify(|state| state.status = FetchStatus::Fetching);

        match self.fetcher.fetch_dashboard(&self.project_id).await {
            Ok(snapshot) => {
                debug!(project_id = %self.project_id, "dashboard snapshot refreshed");
                self.tx.send_modify(|state| {
                    state.snapshot = Some(Arc::new(snapshot));
                    state.status = FetchStatus::Idle;
                    state.error_message = None;
                });
                RefreshOutcome::Completed
            }
            Err(err) => {
                warn!(project_id = %self.project_id, error = %err, "dashboard fetch failed");
                self.tx.send_modify(|state| {
                    state.status = FetchStatus::Errored;
                    state.error_message = Some(err.to_string());
                });
                RefreshOutcome::Failed
            }
        }
    }

    /// Current snapshot, if any fetch has succeeded yet.
    pub fn snapshot(&self) -> Option<Arc<DashboardResponse>> {
        self.tx.borrow().snapshot.clone()
    }

    /// Current fetch status.
    pub fn status(&self) -> FetchStatus {
        self.tx.borrow().status
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::api::ApiError;
    use crate::models::{MonitorsSummary, ProjectInfo};

    fn sample_snapshot(total: u32) -> DashboardResponse {
        DashboardResponse {
            project: ProjectInfo {
                id: 1,
                name: "p1".to_string(),
                description: String::new(),
            },
            monitors_summary: MonitorsSummary {
                total,
                active: total,
                down: 0,
                warning: 0,
            },
            monitors: Vec::new(),
            recent_incidents: Vec::new(),
        }
    }

    /// Fetcher that counts calls and fails on the listed call numbers
    /// (1-based).
    struct ScriptedFetch {
        calls: Arc<AtomicUsize>,
        fail_on: Vec<usize>,
    }

    impl ScriptedFetch {
        fn new() -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    calls: calls.clone(),
                    fail_on: Vec::new(),
                },
                calls,
            )
        }

        fn failing_on(mut self, call: usize) -> Self {
            self.fail_on.push(call);
            self
        }
    }

    impl FetchDashboard for ScriptedFetch {
        async fn fetch_dashboard(
            &self,
            _project_id: &str,
        ) -> Result<DashboardResponse, ApiError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_on.contains(&call) {
                return Err(ApiError::Status {
                    status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                    path: "/api/projects/p1/dashboard".to_string(),
                });
            }
            Ok(sample_snapshot(call as u32))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_requests_coalesces_to_one_fetch() {
        let (fetch, calls) = ScriptedFetch::new();
        let mut coordinator = RefreshCoordinator::new(fetch, "p1");

        assert_eq!(
            coordinator.request_refresh(false).await,
            RefreshOutcome::Completed
        );
        for _ in 0..5 {
            assert_eq!(
                coordinator.request_refresh(false).await,
                RefreshOutcome::Skipped
            );
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn request_after_cooldown_fetches_again() {
        let (fetch, calls) = ScriptedFetch::new();
        let mut coordinator = RefreshCoordinator::new(fetch, "p1");

        coordinator.request_refresh(false).await;
        tokio::time::sleep(Duration::from_millis(999)).await;
        assert_eq!(
            coordinator.request_refresh(false).await,
            RefreshOutcome::Skipped
        );
        // Exactly on the boundary counts as elapsed.
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(
            coordinator.request_refresh(false).await,
            RefreshOutcome::Completed
        );
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn bypass_ignores_cooldown_and_resets_clock() {
        let (fetch, calls) = ScriptedFetch::new();
        let mut coordinator = RefreshCoordinator::new(fetch, "p1");

        coordinator.request_refresh(false).await;
        assert_eq!(
            coordinator.request_refresh(true).await,
            RefreshOutcome::Completed
        );
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // The bypass restarted the window: a non-bypassing request 600ms
        // later is still inside it.
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(
            coordinator.request_refresh(false).await,
            RefreshOutcome::Skipped
        );
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetch_keeps_previous_snapshot() {
        let (fetch, _calls) = ScriptedFetch::new();
        let fetch = fetch.failing_on(2);
        let mut coordinator = RefreshCoordinator::new(fetch, "p1");

        coordinator.request_refresh(true).await;
        let first = coordinator.snapshot().unwrap();
        assert_eq!(first.monitors_summary.total, 1);

        assert_eq!(
            coordinator.request_refresh(true).await,
            RefreshOutcome::Failed
        );
        assert_eq!(coordinator.status(), FetchStatus::Errored);

        let state = coordinator.subscribe().borrow().clone();
        assert!(state.error_message.is_some());
        // Stale-but-available: the old snapshot is untouched.
        assert_eq!(state.snapshot.unwrap().monitors_summary.total, 1);

        // The next successful fetch clears the error.
        assert_eq!(
            coordinator.request_refresh(true).await,
            RefreshOutcome::Completed
        );
        assert_eq!(coordinator.status(), FetchStatus::Idle);
        assert!(coordinator.subscribe().borrow().error_message.is_none());
        assert_eq!(coordinator.snapshot().unwrap().monitors_summary.total, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn watcher_sees_whole_snapshots_only() {
        let (fetch, _calls) = ScriptedFetch::new();
        let mut coordinator = RefreshCoordinator::new(fetch, "p1");
        let mut rx = coordinator.subscribe();

        coordinator.request_refresh(true).await;
        rx.changed().await.unwrap();

        // Whatever intermediate states were published, each borrow is a
        // complete value: either no snapshot or a full one.
        let state = rx.borrow_and_update().clone();
        let snapshot = state.snapshot.expect("snapshot after successful fetch");
        assert_eq!(snapshot.monitors_summary.total, 1);
        assert_eq!(snapshot.project.name, "p1");
    }

    #[tokio::test(start_paused = true)]
    async fn first_request_is_never_dropped() {
        let (fetch, calls) = ScriptedFetch::new();
        let mut coordinator = RefreshCoordinator::new(fetch, "p1");
        assert_eq!(
            coordinator.request_refresh(false).await,
            RefreshOutcome::Completed
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
