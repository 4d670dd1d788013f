//! Console configuration.
//!
//! Settings are resolved once at startup with the precedence
//! command line > environment > `~/.relief/config.yaml` > defaults.
//!
//! ```yaml
//! api_base_url: http://localhost:8000
//! alert_poll_interval_secs: 10
//! log_poll_interval_secs: 5
//! plan_selection: latest_issued
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ReliefError, Result};

/// Base URL used when nothing else is configured (local development backend).
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Default alert feed poll interval.
pub const DEFAULT_ALERT_POLL_INTERVAL_SECS: u64 = 10;

/// Default log stream poll interval.
pub const DEFAULT_LOG_POLL_INTERVAL_SECS: u64 = 5;

/// Default lifetime of an operator notification.
pub const DEFAULT_NOTIFICATION_TTL_SECS: u64 = 6;

pub const ENV_API_BASE: &str = "RELIEF_API_BASE";
pub const ENV_ALERT_POLL_SECS: &str = "RELIEF_ALERT_POLL_SECS";
pub const ENV_LOG_POLL_SECS: &str = "RELIEF_LOG_POLL_SECS";

/// Which completed plan request gets to select the displayed plan when
/// requests overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanSelection {
    /// Only the most recently issued request may select a plan; earlier
    /// requests that complete later are discarded.
    #[default]
    LatestIssued,
    /// Whichever request completes last wins, regardless of issue order.
    LatestResolved,
}

/// Relief console configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Base URL for all backend endpoints
    pub api_base_url: String,

    /// Seconds between alert feed polls
    pub alert_poll_interval_secs: u64,

    /// Seconds between log stream polls
    pub log_poll_interval_secs: u64,

    /// Per-request timeout; `None` keeps the HTTP client's default behavior
    pub request_timeout_secs: Option<u64>,

    /// Resolution policy for overlapping plan requests
    pub plan_selection: PlanSelection,

    /// Seconds an operator notification stays on screen
    pub notification_ttl_secs: u64,

    /// Initial theme name
    pub theme: Option<String>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            alert_poll_interval_secs: DEFAULT_ALERT_POLL_INTERVAL_SECS,
            log_poll_interval_secs: DEFAULT_LOG_POLL_INTERVAL_SECS,
            request_timeout_secs: None,
            plan_selection: PlanSelection::default(),
            notification_ttl_secs: DEFAULT_NOTIFICATION_TTL_SECS,
            theme: None,
        }
    }
}

impl ConsoleConfig {
    /// Resolve the effective configuration.
    ///
    /// An explicit `config_path` must exist; the default path is optional.
    pub fn resolve(config_path: Option<&Path>, api_base_override: Option<&str>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::load_file(path)?,
            None => {
                let path = default_config_path()?;
                if path.exists() {
                    Self::load_file(&path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env()?;

        if let Some(base) = api_base_override {
            config.api_base_url = base.to_string();
        }

        config.normalize();
        config.validate()?;

        tracing::info!(
            api_base_url = %config.api_base_url,
            alert_poll_secs = config.alert_poll_interval_secs,
            log_poll_secs = config.log_poll_interval_secs,
            "configuration resolved"
        );

        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ReliefError::config_not_found_with_source(path, e)
            } else {
                ReliefError::io("reading config", path, e)
            }
        })?;

        Self::from_yaml(&content).map_err(|message| ReliefError::ConfigInvalid {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parse configuration from YAML text. An empty document yields defaults.
    pub fn from_yaml(content: &str) -> std::result::Result<Self, String> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }

    /// Apply `RELIEF_*` environment overrides.
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(base) = std::env::var(ENV_API_BASE) {
            if !base.trim().is_empty() {
                self.api_base_url = base;
            }
        }
        if let Some(secs) = env_secs(ENV_ALERT_POLL_SECS)? {
            self.alert_poll_interval_secs = secs;
        }
        if let Some(secs) = env_secs(ENV_LOG_POLL_SECS)? {
            self.log_poll_interval_secs = secs;
        }
        Ok(())
    }

    /// Trim whitespace and trailing slashes from the base URL.
    pub fn normalize(&mut self) {
        self.api_base_url = self.api_base_url.trim().trim_end_matches('/').to_string();
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let base = self.api_base_url.as_str();
        let rest = base
            .strip_prefix("http://")
            .or_else(|| base.strip_prefix("https://"))
            .ok_or_else(|| {
                ReliefError::config_validation(format!(
                    "api_base_url must start with http:// or https:// (got '{base}')"
                ))
            })?;
        if rest.is_empty() {
            return Err(ReliefError::config_validation("api_base_url has no host"));
        }
        if self.alert_poll_interval_secs == 0 {
            return Err(ReliefError::config_validation(
                "alert_poll_interval_secs must be positive",
            ));
        }
        if self.log_poll_interval_secs == 0 {
            return Err(ReliefError::config_validation(
                "log_poll_interval_secs must be positive",
            ));
        }
        Ok(())
    }

    /// Set the backend base URL.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set the plan selection policy.
    pub fn with_plan_selection(mut self, policy: PlanSelection) -> Self {
        self.plan_selection = policy;
        self
    }

    /// Alert feed poll interval.
    pub fn alert_poll_interval(&self) -> Duration {
        Duration::from_secs(self.alert_poll_interval_secs)
    }

    /// Log stream poll interval.
    pub fn log_poll_interval(&self) -> Duration {
        Duration::from_secs(self.log_poll_interval_secs)
    }

    /// Per-request timeout, if configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Notification lifetime.
    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.notification_ttl_secs)
    }
}

fn env_secs(var: &str) -> Result<Option<u64>> {
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ReliefError::EnvOverride {
                var: var.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}

/// The console's home directory, `~/.relief`.
pub fn relief_home() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .ok_or_else(|| ReliefError::internal("HOME environment variable not set"))?;
    Ok(home.join(".relief"))
}

/// Default config file location, `~/.relief/config.yaml`.
pub fn default_config_path() -> Result<PathBuf> {
    Ok(relief_home()?.join("config.yaml"))
}
