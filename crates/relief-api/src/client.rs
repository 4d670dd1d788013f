//! HTTP client for the relief coordinator backend.
//!
//! [`HttpBackend`] speaks the three endpoints the console consumes, plus the
//! health check. The [`ReliefBackend`] trait is the seam the coordination
//! layer depends on, so tests can substitute a scripted backend.
//!
//! ## Example
//!
//! ```no_run
//! use relief_api::{HttpBackend, ReliefBackend};
//!
//! # async fn example() -> relief_api::Result<()> {
//! let backend = HttpBackend::new("http://localhost:8000", None)?;
//! let alerts = backend.poll_alerts().await?;
//! if let Some(first) = alerts.first() {
//!     let plan = backend.request_plan(&first.id).await?;
//!     println!("{} tasks", plan.tasks.len());
//! }
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use relief_core::{Alert, ConsoleConfig, HealthStatus, LogRecord, LogsEnvelope, Plan};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{ApiError, Result};

pub const POLL_ALERTS_PATH: &str = "/api/poll_alerts";
pub const LOGS_PATH: &str = "/api/logs";
pub const HEALTH_PATH: &str = "/api/health";

/// The backend contracts consumed by the console.
#[async_trait]
pub trait ReliefBackend: Send + Sync {
    /// `GET /api/poll_alerts`: the current alert set, in feed order.
    async fn poll_alerts(&self) -> Result<Vec<Alert>>;

    /// `POST /api/plan/{alert_id}`: generate a plan for one alert.
    async fn request_plan(&self, alert_id: &str) -> Result<Plan>;

    /// `GET /api/logs`: recent log records, in the order supplied.
    async fn fetch_logs(&self) -> Result<Vec<LogRecord>>;

    /// `GET /api/health`: liveness check.
    async fn health(&self) -> Result<HealthStatus>;

    /// Base URL requests are resolved against.
    fn base_url(&self) -> &str;
}

/// [`ReliefBackend`] over HTTP using reqwest.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
    base_str: String,
}

impl HttpBackend {
    /// Create a backend for `base_url`.
    ///
    /// With `timeout` set to `None` the client keeps reqwest's default (no
    /// overall request timeout).
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_str = base_url.trim().trim_end_matches('/').to_string();
        let base_url = Url::parse(&base_str)
            .map_err(|e| ApiError::ConfigError(format!("Invalid base URL '{base_str}': {e}")))?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::ConfigError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            base_str,
        })
    }

    /// Create a backend from the resolved console configuration.
    pub fn from_config(config: &ConsoleConfig) -> Result<Self> {
        Self::new(&config.api_base_url, config.request_timeout())
    }

    /// Absolute URL for a fixed endpoint path.
    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_str, path)
    }

    /// Absolute URL for the plan endpoint; the id is sent as one path segment.
    ///
    /// `.` and `..` are refused: URL normalization folds them (even
    /// percent-encoded) into the parent path.
    pub fn plan_url(&self, alert_id: &str) -> Result<Url> {
        if alert_id == "." || alert_id == ".." {
            return Err(ApiError::ConfigError(format!(
                "Alert id {alert_id:?} cannot be sent as a path segment"
            )));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::ConfigError(format!("Base URL cannot carry a path: {}", self.base_str)))?
            .pop_if_empty()
            .push("api")
            .push("plan")
            .push(alert_id);
        Ok(url)
    }

    /// Read a successful body as text, turning non-success statuses into errors.
    async fn read_body(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_http_status(status.as_u16(), &body));
        }
        Ok(response.text().await?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let body = Self::read_body(response).await?;
        serde_json::from_str(&body).map_err(|e| ApiError::invalid_response(path, e.to_string()))
    }
}

#[async_trait]
impl ReliefBackend for HttpBackend {
    async fn poll_alerts(&self) -> Result<Vec<Alert>> {
        self.get_json(POLL_ALERTS_PATH).await
    }

    async fn request_plan(&self, alert_id: &str) -> Result<Plan> {
        let url = self.plan_url(alert_id)?;
        debug!("POST {}", url);

        let response = self.client.post(url.clone()).send().await?;
        debug!(status = response.status().as_u16(), "plan response");
        let body = Self::read_body(response).await?;

        parse_plan(&body).map_err(|message| ApiError::invalid_response(url.path(), message))
    }

    async fn fetch_logs(&self) -> Result<Vec<LogRecord>> {
        let envelope: LogsEnvelope = self.get_json(LOGS_PATH).await?;
        Ok(envelope.into_records())
    }

    async fn health(&self) -> Result<HealthStatus> {
        self.get_json(HEALTH_PATH).await
    }

    fn base_url(&self) -> &str {
        &self.base_str
    }
}

/// Parse a plan body. Anything other than a JSON object is rejected.
pub fn parse_plan(body: &str) -> std::result::Result<Plan, String> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| e.to_string())?;
    if !value.is_object() {
        return Err(format!("expected a JSON object, got {}", json_kind(&value)));
    }
    serde_json::from_value(value).map_err(|e| e.to_string())
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
