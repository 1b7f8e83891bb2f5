//! Command execution logic.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::models::{CheckStatus, IncidentStatus, MonitorStatus};
use crate::sync::{ConnectionStatus, DashboardSession, DashboardState, SessionConfig};

use super::args::{Cli, Commands};

/// Execute a CLI command.
pub async fn execute(cli: Cli) -> Result<()> {
    let config = match cli.server {
        Some(url) => ClientConfig::new(url),
        None => ClientConfig::from_env(),
    };

    match cli.command {
        Commands::Watch {
            project_id,
            interval,
        } => watch(config, &project_id, interval).await,
        Commands::Checks {
            project_id,
            monitor_id,
        } => checks(config, &project_id, &monitor_id).await,
    }
}

/// Watch a project's dashboard until interrupted.
async fn watch(config: ClientConfig, project_id: &str, interval: u64) -> Result<()> {
    let session_config = SessionConfig {
        client: config,
        periodic_refresh: (interval > 0).then(|| Duration::from_secs(interval)),
        ..SessionConfig::default()
    };

    let handle = DashboardSession::start(session_config, project_id)
        .context("Failed to start dashboard session")?;

    println!("Watching project {project_id} (ctrl-c to stop)");

    let mut dashboard = handle.dashboard();
    let mut connection = handle.connection();

    loop {
        tokio::select! {
            changed = dashboard.changed() => {
                if changed.is_err() {
                    break;
                }
                print_dashboard(&dashboard.borrow_and_update());
            }
            changed = connection.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = connection.borrow_and_update().status;
                print_connection(status);
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    handle.stop();
    Ok(())
}

fn print_connection(status: ConnectionStatus) {
    match status {
        ConnectionStatus::Connected => println!("[live] connected"),
        ConnectionStatus::Connecting => println!("[live] connecting..."),
        ConnectionStatus::Disconnected => println!("[live] disconnected"),
        ConnectionStatus::Errored => {
            println!("[live] unavailable - falling back to periodic refresh");
        }
    }
}

fn print_dashboard(state: &DashboardState) {
    if let Some(ref message) = state.error_message {
        println!("[error] {message} (showing last good data)");
    }

    let Some(ref snapshot) = state.snapshot else {
        return;
    };

    let summary = snapshot.monitors_summary;
    println!(
        "{}: {} monitors ({} active, {} down, {} warning)",
        snapshot.project.name, summary.total, summary.active, summary.down, summary.warning
    );

    for monitor in &snapshot.monitors {
        let status = match monitor.status {
            MonitorStatus::Active => "active",
            MonitorStatus::Paused => "paused",
            MonitorStatus::Inactive => "inactive",
            MonitorStatus::Unknown => "unknown",
        };
        let response = monitor
            .last_check
            .as_ref()
            .map_or_else(|| "-".to_string(), |c| format!("{}ms", c.response_time));
        println!("  {:<24} {:<8} {response}", monitor.name, status);
    }

    let ongoing = snapshot
        .recent_incidents
        .iter()
        .filter(|i| i.status == IncidentStatus::Ongoing)
        .count();
    if ongoing > 0 {
        println!("  {ongoing} ongoing incident(s)");
    }
}

/// Print recent check history for a monitor.
async fn checks(config: ClientConfig, project_id: &str, monitor_id: &str) -> Result<()> {
    let client = ApiClient::new(&config).context("Failed to build API client")?;
    let checks = client
        .fetch_monitor_checks(project_id, monitor_id)
        .await
        .context("Failed to fetch monitor checks")?;

    if checks.is_empty() {
        println!("No checks recorded for monitor {monitor_id}");
        return Ok(());
    }

    for check in checks {
        let status = match check.status {
            CheckStatus::Success => "ok",
            CheckStatus::Failure => "FAIL",
            CheckStatus::Timeout => "TIMEOUT",
            CheckStatus::Unknown => "?",
        };
        println!(
            "{}  {:<8} {:>6}ms  {}",
            check.checked_at.format("%Y-%m-%d %H:%M:%S"),
            status,
            check.response_time,
            check.message
        );
    }

    Ok(())
}
