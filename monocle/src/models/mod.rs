//! Data models for dashboard snapshots and push messages.

mod dashboard;
mod push;

pub use dashboard::{
    CheckStatus, DashboardResponse, IncidentStatus, IncidentSummary, LastCheck, MonitorCheck,
    MonitorConfig, MonitorKind, MonitorStatus, MonitorSummary, MonitorsSummary, ProjectInfo,
};
pub use push::PushMessage;
