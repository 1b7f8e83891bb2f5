//! HTTP client for the monitoring API.
//!
//! The refresh coordinator consumes this through the [`FetchDashboard`]
//! trait so tests can substitute a scripted fetcher. All failures —
//! transport, 4xx, 5xx — collapse into one [`ApiError`]; the sync core
//! treats them uniformly.

use std::future::Future;

use reqwest::StatusCode;
use thiserror::Error;

use crate::config::ClientConfig;
use crate::models::{DashboardResponse, MonitorCheck};

/// Error from a monitoring API request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection-level failure or body decode failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("server returned {status} for {path}")]
    Status { status: StatusCode, path: String },
}

/// Seam between the refresh coordinator and the HTTP layer.
pub trait FetchDashboard {
    /// Fetch the full dashboard snapshot for a project.
    fn fetch_dashboard(
        &self,
        project_id: &str,
    ) -> impl Future<Output = Result<DashboardResponse, ApiError>> + Send;
}

/// Client for the monitoring REST API.
///
/// Credentials ride on the underlying cookie store, so a session cookie
/// obtained elsewhere is sent with every request.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client for the given configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            http,
            base_url: config.api_url.clone(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{path}", self.base_url);
        let response = self.http.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status,
                path: path.to_string(),
            });
        }

        Ok(response.json().await?)
    }

    /// Fetch the recent check history for one monitor.
    pub async fn fetch_monitor_checks(
        &self,
        project_id: &str,
        monitor_id: &str,
    ) -> Result<Vec<MonitorCheck>, ApiError> {
        self.get_json(&format!(
            "/api/projects/{project_id}/monitors/{monitor_id}/checks"
        ))
        .await
    }
}

impl FetchDashboard for ApiClient {
    async fn fetch_dashboard(&self, project_id: &str) -> Result<DashboardResponse, ApiError> {
        self.get_json(&format!("/api/projects/{project_id}/dashboard"))
            .await
    }
}
