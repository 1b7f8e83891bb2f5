//! Real-time dashboard synchronization core.
//!
//! - [`channel`]: one websocket connection surfacing ordered signals
//! - [`reconnect`]: pure exponential-backoff decision logic
//! - [`refresh`]: cooldown-coalesced snapshot fetching
//! - [`session`]: the composition, lifecycle, and watchable outputs

pub mod channel;
pub mod reconnect;
pub mod refresh;
pub mod session;

pub use channel::{ChannelSignal, EventChannel};
pub use reconnect::{ReconnectDecision, ReconnectPolicy, ReconnectState};
pub use refresh::{DashboardState, FetchStatus, RefreshCoordinator, RefreshOutcome};
pub use session::{
    ConnectionState, ConnectionStatus, DashboardSession, SessionConfig, SessionError,
    SessionHandle,
};
