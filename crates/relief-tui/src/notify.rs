//! Transient operator notifications.
//!
//! Notifications are non-blocking: they appear in the footer, expire after a
//! time-to-live, and can be dismissed with `x`. Plan request failures are the
//! main producer; poll failures are never raised here, they only change the
//! feed indicator and go to the diagnostic log.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

/// Default number of notifications kept before the oldest is dropped.
pub const DEFAULT_MAX_NOTIFICATIONS: usize = 8;

/// Notification level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NotificationLevel {
    /// Informational (plan delivered)
    Info = 0,
    /// Something degraded but the console keeps working
    Warning = 1,
    /// An operator action failed
    Error = 2,
}

impl NotificationLevel {
    /// Get the icon for this level.
    pub fn icon(&self) -> &'static str {
        match self {
            NotificationLevel::Info => "ℹ",
            NotificationLevel::Warning => "⚠",
            NotificationLevel::Error => "✖",
        }
    }
}

/// A single operator notification.
#[derive(Debug, Clone)]
pub struct Notification {
    /// Unique identifier within this console session
    pub id: u64,
    pub level: NotificationLevel,
    /// Human-readable text
    pub message: String,
    /// Wall-clock time for display
    pub created_at: DateTime<Local>,
    raised_at: Instant,
}

impl Notification {
    /// Whether this notification has outlived `ttl` at `now`.
    pub fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) >= ttl
    }

    /// Single-line rendering for the footer.
    pub fn format_compact(&self) -> String {
        format!(
            "{} {} ({})",
            self.level.icon(),
            self.message,
            self.created_at.format("%H:%M:%S")
        )
    }
}

/// Holds active notifications, newest last.
#[derive(Debug)]
pub struct NotificationCenter {
    queue: VecDeque<Notification>,
    next_id: u64,
    ttl: Duration,
    max: usize,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(Duration::from_secs(relief_core::config::DEFAULT_NOTIFICATION_TTL_SECS))
    }
}

impl NotificationCenter {
    /// Create a notification center with the given time-to-live.
    pub fn new(ttl: Duration) -> Self {
        Self {
            queue: VecDeque::new(),
            next_id: 1,
            ttl,
            max: DEFAULT_MAX_NOTIFICATIONS,
        }
    }

    /// Raise a notification. Returns its id.
    pub fn raise(&mut self, level: NotificationLevel, message: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        self.queue.push_back(Notification {
            id,
            level,
            message: message.into(),
            created_at: Local::now(),
            raised_at: Instant::now(),
        });
        while self.queue.len() > self.max {
            self.queue.pop_front();
        }
        id
    }

    /// The notification currently shown (the newest one).
    pub fn current(&self) -> Option<&Notification> {
        self.queue.back()
    }

    /// Dismiss the current notification. Returns true if one was removed.
    pub fn dismiss(&mut self) -> bool {
        self.queue.pop_back().is_some()
    }

    /// Drop expired notifications. Returns true if anything was removed.
    pub fn expire(&mut self, now: Instant) -> bool {
        let before = self.queue.len();
        let ttl = self.ttl;
        self.queue.retain(|n| !n.is_expired(ttl, now));
        self.queue.len() != before
    }

    /// All active notifications, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.queue.iter()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of error-level notifications still active.
    pub fn error_count(&self) -> usize {
        self.queue
            .iter()
            .filter(|n| n.level == NotificationLevel::Error)
            .count()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
