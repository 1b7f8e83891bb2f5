//! Dashboard snapshot models.
//!
//! A `DashboardResponse` is the complete bundle the API returns for one
//! project: metadata, aggregate counts, monitor summaries, and recent
//! incidents. Each successful fetch produces a whole new value; nothing
//! here is ever mutated in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of check a monitor performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorKind {
    Http,
    Dns,
    Ssl,
    Database,
    /// Kinds added server-side that this client does not know yet.
    #[serde(other)]
    Unknown,
}

/// Whether a monitor is currently being checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorStatus {
    Active,
    Paused,
    Inactive,
    #[serde(other)]
    Unknown,
}

/// Outcome of a single check execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Success,
    Failure,
    Timeout,
    #[serde(other)]
    Unknown,
}

/// Incident lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    Ongoing,
    Resolved,
    #[serde(other)]
    Unknown,
}

/// Project metadata attached to a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Aggregate monitor counts for the project.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MonitorsSummary {
    pub total: u32,
    pub active: u32,
    pub down: u32,
    pub warning: u32,
}

/// Per-kind check configuration. The backend sends only the fields
/// relevant to the monitor's kind; everything is optional here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub url: Option<String>,
    pub method: Option<String>,
    pub expected_status: Option<u16>,
    /// Timeout in seconds.
    pub timeout: Option<u32>,
    pub domain: Option<String>,
    pub record_type: Option<String>,
    pub expected: Option<String>,
    pub days_before_expiry: Option<u32>,
    pub verify_chain: Option<bool>,
    pub check_san: Option<bool>,
}

/// Result of the most recent check, embedded in a monitor summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastCheck {
    pub id: i64,
    pub status: CheckStatus,
    /// Response time in milliseconds.
    pub response_time: u64,
    pub message: String,
    pub checked_at: DateTime<Utc>,
}

/// One monitor's row on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorSummary {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: MonitorKind,
    pub status: MonitorStatus,
    /// Check interval in seconds.
    pub interval: u64,
    #[serde(default)]
    pub config: MonitorConfig,
    pub last_check: Option<LastCheck>,
    /// Uptime over the reporting window, 0-100.
    pub uptime_percentage: Option<f64>,
    /// Average response time in milliseconds.
    pub avg_response_time: Option<f64>,
}

/// A single historical check execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorCheck {
    pub id: i64,
    pub monitor_id: i64,
    pub status: CheckStatus,
    /// Response time in milliseconds.
    pub response_time: u64,
    pub message: String,
    pub checked_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A recent incident as shown on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentSummary {
    pub id: i64,
    pub monitor_id: i64,
    pub monitor_name: String,
    pub status: IncidentStatus,
    pub started_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    /// Duration in seconds, present once resolved.
    pub duration: Option<u64>,
}

/// The complete dashboard snapshot for one project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub project: ProjectInfo,
    pub monitors_summary: MonitorsSummary,
    pub monitors: Vec<MonitorSummary>,
    pub recent_incidents: Vec<IncidentSummary>,
}
