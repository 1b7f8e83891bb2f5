//! Per-project dashboard session.
//!
//! Composes the event channel, reconnect policy, and refresh coordinator
//! into one live session per mounted dashboard view. A single
//! coordinating task consumes channel signals, commands, and timers in
//! arrival order; the presentation layer observes everything through two
//! watch channels and never touches the internals.
//!
//! When the viewed project changes, the caller stops this session and
//! starts a new one; nothing carries over.

use std::future;
use std::pin::Pin;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior, Sleep};
use tracing::{debug, error, info, warn};

use crate::api::{ApiClient, ApiError, FetchDashboard};
use crate::config::ClientConfig;
use crate::models::PushMessage;
use crate::sync::channel::{ChannelSignal, EventChannel};
use crate::sync::reconnect::{ReconnectDecision, ReconnectPolicy, ReconnectState};
use crate::sync::refresh::{DashboardState, RefreshCoordinator, DEFAULT_COOLDOWN};

/// Default interval for the periodic fallback refresh.
pub const DEFAULT_PERIODIC_REFRESH: Duration = Duration::from_secs(60);

/// Live-update connection state, as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    /// Reconnect attempts are exhausted; live updates are unavailable
    /// until a new session starts. Pull-based refresh keeps working.
    Errored,
}

/// Published connection state.
#[derive(Debug, Clone, Default)]
pub struct ConnectionState {
    pub status: ConnectionStatus,
    /// When the last push message arrived on the channel.
    pub last_event_at: Option<DateTime<Utc>>,
}

/// Session construction parameters.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub client: ClientConfig,
    pub reconnect: ReconnectPolicy,
    /// Cooldown window for non-bypassing refresh triggers.
    pub cooldown: Duration,
    /// Fallback refresh interval for missed push events; `None` disables.
    pub periodic_refresh: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            reconnect: ReconnectPolicy::default(),
            cooldown: DEFAULT_COOLDOWN,
            periodic_refresh: Some(DEFAULT_PERIODIC_REFRESH),
        }
    }
}

/// Error starting a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No project id was supplied; the session never starts.
    #[error("project id must not be empty")]
    MissingProjectId,
    #[error(transparent)]
    Api(#[from] ApiError),
}

enum SessionCommand {
    Refresh,
}

/// Handle to a running session.
///
/// Dropping the handle (or calling [`stop`](Self::stop)) aborts the
/// coordinating task: pending reconnect and periodic timers are
/// cancelled and an in-flight fetch is dropped, its result discarded.
pub struct SessionHandle {
    dashboard: watch::Receiver<DashboardState>,
    connection: watch::Receiver<ConnectionState>,
    cmd_tx: mpsc::Sender<SessionCommand>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Watchable snapshot / loading / error state.
    pub fn dashboard(&self) -> watch::Receiver<DashboardState> {
        self.dashboard.clone()
    }

    /// Watchable connection status.
    pub fn connection(&self) -> watch::Receiver<ConnectionState> {
        self.connection.clone()
    }

    /// Trigger a manual refresh; bypasses the cooldown.
    pub async fn refresh(&self) {
        let _ = self.cmd_tx.send(SessionCommand::Refresh).await;
    }

    /// Stop the session, cancelling all timers and the channel.
    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Entry point for starting per-project sessions.
pub struct DashboardSession;

impl DashboardSession {
    /// Start a session for a project using the real API client.
    pub fn start(config: SessionConfig, project_id: &str) -> Result<SessionHandle, SessionError> {
        let fetcher = ApiClient::new(&config.client)?;
        Self::start_with_fetcher(config, project_id, fetcher)
    }

    /// Start a session with an explicit fetcher implementation.
    pub fn start_with_fetcher<F>(
        config: SessionConfig,
        project_id: &str,
        fetcher: F,
    ) -> Result<SessionHandle, SessionError>
    where
        F: FetchDashboard + Send + 'static,
    {
        if project_id.trim().is_empty() {
            return Err(SessionError::MissingProjectId);
        }

        let (channel, events_rx) = EventChannel::new(project_id, &config.client.ws_url);
        let coordinator =
            RefreshCoordinator::with_cooldown(fetcher, project_id, config.cooldown);
        let dashboard = coordinator.subscribe();
        let (conn_tx, connection) = watch::channel(ConnectionState::default());
        let (cmd_tx, cmd_rx) = mpsc::channel(16);

        let runner = SessionRunner {
            project_id: project_id.to_string(),
            channel,
            events_rx,
            coordinator,
            policy: config.reconnect,
            reconnect_state: ReconnectState::default(),
            conn_tx,
            cmd_rx,
            periodic_refresh: config.periodic_refresh,
        };

        let task = tokio::spawn(runner.run());

        Ok(SessionHandle {
            dashboard,
            connection,
            cmd_tx,
            task,
        })
    }
}

struct SessionRunner<F> {
    project_id: String,
    channel: EventChannel,
    events_rx: mpsc::Receiver<ChannelSignal>,
    coordinator: RefreshCoordinator<F>,
    policy: ReconnectPolicy,
    reconnect_state: ReconnectState,
    conn_tx: watch::Sender<ConnectionState>,
    cmd_rx: mpsc::Receiver<SessionCommand>,
    periodic_refresh: Option<Duration>,
}

impl<F: FetchDashboard + Send + 'static> SessionRunner<F> {
    async fn run(mut self) {
        info!(project_id = %self.project_id, "session started");

        // Initial load, then bring up the push channel.
        self.coordinator.request_refresh(true).await;
        self.set_status(ConnectionStatus::Connecting);
        self.channel.open();

        let mut periodic = self.periodic_refresh.map(|period| {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });
        let mut reconnect_timer: Option<Pin<Box<Sleep>>> = None;

        loop {
            tokio::select! {
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(SessionCommand::Refresh) => {
                        self.coordinator.request_refresh(true).await;
                    }
                    // All handles dropped; shut down.
                    None => break,
                },
                signal = self.events_rx.recv() => {
                    if let Some(signal) = signal {
                        self.handle_signal(signal, &mut reconnect_timer).await;
                    }
                },
                () = wait_reconnect(&mut reconnect_timer), if reconnect_timer.is_some() => {
                    reconnect_timer = None;
                    self.set_status(ConnectionStatus::Connecting);
                    self.channel.open();
                },
                () = wait_tick(&mut periodic), if periodic.is_some() => {
                    self.coordinator.request_refresh(false).await;
                },
            }
        }

        self.channel.close();
        info!(project_id = %self.project_id, "session stopped");
    }

    async fn handle_signal(
        &mut self,
        signal: ChannelSignal,
        reconnect_timer: &mut Option<Pin<Box<Sleep>>>,
    ) {
        match signal {
            ChannelSignal::Opened => {
                info!(project_id = %self.project_id, "event channel connected");
                self.policy.reset(&mut self.reconnect_state);
                self.set_status(ConnectionStatus::Connected);
            }
            ChannelSignal::Message(PushMessage::Connected { project_id }) => {
                debug!(project_id = %project_id, "connection acknowledged");
                self.touch_last_event();
            }
            ChannelSignal::Message(PushMessage::Refresh { message }) => {
                debug!(project_id = %self.project_id, message = %message, "refresh requested by server");
                self.touch_last_event();
                self.coordinator.request_refresh(false).await;
            }
            ChannelSignal::Message(PushMessage::Unknown { kind }) => {
                warn!(kind = %kind, "unknown push message type ignored");
            }
            ChannelSignal::Error { detail } => {
                // A Closed signal follows; the reconnect decision happens there.
                warn!(project_id = %self.project_id, detail = %detail, "event channel error");
            }
            ChannelSignal::Closed { code, reason } => {
                debug!(project_id = %self.project_id, code = ?code, reason = %reason, "event channel closed");
                self.set_status(ConnectionStatus::Disconnected);
                match self.policy.on_disconnected(&mut self.reconnect_state) {
                    ReconnectDecision::RetryAfter(delay) => {
                        info!(
                            project_id = %self.project_id,
                            attempt = self.reconnect_state.attempts(),
                            delay_ms = delay.as_millis() as u64,
                            "scheduling reconnect"
                        );
                        *reconnect_timer = Some(Box::pin(tokio::time::sleep(delay)));
                    }
                    ReconnectDecision::GiveUp => {
                        error!(project_id = %self.project_id, "live updates unavailable: reconnect attempts exhausted");
                        self.set_status(ConnectionStatus::Errored);
                    }
                }
            }
        }
    }

    fn set_status(&self, status: ConnectionStatus) {
        self.conn_tx.send_modify(|state| state.status = status);
    }

    fn touch_last_event(&self) {
        self.conn_tx
            .send_modify(|state| state.last_event_at = Some(Utc::now()));
    }
}

async fn wait_reconnect(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer.as_mut() {
        Some(sleep) => sleep.as_mut().await,
        None => future::pending().await,
    }
}

async fn wait_tick(interval: &mut Option<Interval>) {
    match interval.as_mut() {
        Some(interval) => {
            interval.tick().await;
        }
        None => future::pending().await,
    }
}
