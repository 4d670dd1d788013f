//! Shared console state.
//!
//! [`ConsoleState`] owns everything the views read: the alert collection,
//! the selected plan, log records, the coarse busy indicator and operator
//! notifications. Fields are private; every mutation goes through one of the
//! transition functions below, each matching one component outcome.

use std::time::Instant;

use chrono::{DateTime, Local};
use relief_core::{Alert, LogRecord, Plan, ScoredAlert};

use crate::notify::{NotificationCenter, NotificationLevel};
use crate::plan::PlanRejection;

/// Alert feed indicator shown in the header.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FeedStatus {
    /// No poll has completed yet
    #[default]
    Loading,
    /// Last poll succeeded
    Live {
        count: usize,
        updated_at: DateTime<Local>,
    },
    /// Last poll failed; the collection was cleared
    Unavailable {
        reason: String,
        since: DateTime<Local>,
    },
}

impl FeedStatus {
    pub fn is_live(&self) -> bool {
        matches!(self, FeedStatus::Live { .. })
    }

    /// Short label for the header.
    pub fn label(&self) -> String {
        match self {
            FeedStatus::Loading => "Loading alerts...".to_string(),
            FeedStatus::Live { count, updated_at } => {
                format!("Live: {} alerts @ {}", count, updated_at.format("%H:%M:%S"))
            }
            FeedStatus::Unavailable { since, .. } => {
                format!("Feed unavailable since {}", since.format("%H:%M:%S"))
            }
        }
    }
}

/// Result of the startup health check.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BackendHealth {
    #[default]
    Unknown,
    Up,
    Down(String),
}

/// The plan currently displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedPlan {
    /// Alert the plan was requested for
    pub alert_id: String,
    pub plan: Plan,
    pub received_at: DateTime<Local>,
}

/// Owned console state. See module docs.
#[derive(Debug, Default)]
pub struct ConsoleState {
    alerts: Vec<ScoredAlert>,
    feed_status: FeedStatus,
    plan: Option<SelectedPlan>,
    pending_plan: Option<String>,
    logs: Vec<LogRecord>,
    logs_updated_at: Option<DateTime<Local>>,
    busy: usize,
    health: BackendHealth,
    notifications: NotificationCenter,
}

impl ConsoleState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state whose notifications expire after `ttl`.
    pub fn with_notification_ttl(ttl: std::time::Duration) -> Self {
        Self {
            notifications: NotificationCenter::new(ttl),
            ..Self::default()
        }
    }

    // ============================================================
    // Alert feed transitions
    // ============================================================

    /// Successful poll: the collection becomes exactly `alerts`, in feed order,
    /// with risk recomputed for every entry.
    pub fn replace_alerts(&mut self, alerts: Vec<Alert>) {
        self.alerts = alerts.into_iter().map(ScoredAlert::new).collect();
        self.feed_status = FeedStatus::Live {
            count: self.alerts.len(),
            updated_at: Local::now(),
        };
    }

    /// Failed poll: nothing stale is kept.
    pub fn clear_alerts(&mut self, reason: impl Into<String>) {
        self.alerts.clear();
        self.feed_status = FeedStatus::Unavailable {
            reason: reason.into(),
            since: Local::now(),
        };
    }

    // ============================================================
    // Plan transitions
    // ============================================================

    /// A plan request was issued for `alert_id`.
    pub fn plan_requested(&mut self, alert_id: &str) {
        self.pending_plan = Some(alert_id.to_string());
    }

    /// Record which request (if any) is still outstanding after a resolution.
    pub fn set_pending_plan(&mut self, alert_id: Option<String>) {
        self.pending_plan = alert_id;
    }

    /// Delivered plan replaces whatever was selected.
    pub fn select_plan(&mut self, alert_id: impl Into<String>, plan: Plan) {
        self.plan = Some(SelectedPlan {
            alert_id: alert_id.into(),
            plan,
            received_at: Local::now(),
        });
    }

    /// Rejected plan request: selection cleared and the operator told why.
    pub fn reject_plan(&mut self, rejection: &PlanRejection) {
        self.plan = None;
        self.notifications
            .raise(NotificationLevel::Error, rejection.notification_text());
    }

    // ============================================================
    // Log transitions
    // ============================================================

    pub fn replace_logs(&mut self, logs: Vec<LogRecord>) {
        self.logs = logs;
        self.logs_updated_at = Some(Local::now());
    }

    pub fn clear_logs(&mut self) {
        self.logs.clear();
        self.logs_updated_at = Some(Local::now());
    }

    // ============================================================
    // Busy indicator and misc
    // ============================================================

    /// A busy-asserting operation started (alert fetch or plan request).
    pub fn begin_work(&mut self) {
        self.busy += 1;
    }

    /// A busy-asserting operation finished.
    pub fn finish_work(&mut self) {
        self.busy = self.busy.saturating_sub(1);
    }

    /// Drop all in-flight accounting (used on disposal).
    pub fn reset_work(&mut self) {
        self.busy = 0;
        self.pending_plan = None;
    }

    pub fn set_health(&mut self, health: BackendHealth) {
        self.health = health;
    }

    /// Raise an informational notification.
    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.notifications.raise(level, message);
    }

    /// Dismiss the newest notification.
    pub fn dismiss_notification(&mut self) -> bool {
        self.notifications.dismiss()
    }

    /// Expire old notifications. Returns true if the display changed.
    pub fn expire_notifications(&mut self, now: Instant) -> bool {
        self.notifications.expire(now)
    }

    // ============================================================
    // Accessors
    // ============================================================

    pub fn alerts(&self) -> &[ScoredAlert] {
        &self.alerts
    }

    /// Look up a known alert by id.
    pub fn alert(&self, id: &str) -> Option<&ScoredAlert> {
        self.alerts.iter().find(|a| a.alert.id == id)
    }

    pub fn feed_status(&self) -> &FeedStatus {
        &self.feed_status
    }

    pub fn plan(&self) -> Option<&SelectedPlan> {
        self.plan.as_ref()
    }

    /// Alert id of the most recently issued plan request still outstanding.
    pub fn pending_plan(&self) -> Option<&str> {
        self.pending_plan.as_deref()
    }

    pub fn logs(&self) -> &[LogRecord] {
        &self.logs
    }

    pub fn logs_updated_at(&self) -> Option<DateTime<Local>> {
        self.logs_updated_at
    }

    /// Coarse loading flag shared by the alert feed and plan requests.
    pub fn is_busy(&self) -> bool {
        self.busy > 0
    }

    pub fn busy_count(&self) -> usize {
        self.busy
    }

    pub fn health(&self) -> &BackendHealth {
        &self.health
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }
}
