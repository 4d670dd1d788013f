//! Console coordination layer.
//!
//! [`Console`] ties the alert feed, plan coordinator and log stream to a
//! [`ReliefBackend`]. Requests run as tokio tasks; each finished task sends a
//! completion back over an unbounded channel and the console applies it on
//! the caller's thread, so [`ConsoleState`] has exactly one writer.
//!
//! The terminal loop drives everything through [`Console::poll_updates`],
//! which fires due timers and drains completed work. Every completion carries
//! the generation it was issued in; after [`Console::dispose`] the generation
//! moves on and late completions are dropped unseen.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use relief_api::ReliefBackend;
use relief_core::{
    Alert, ConsoleConfig, HealthStatus, LogRecord, Plan, PlanSelection, log_plan_event,
    log_poll_event,
};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::feed::{AlertFeed, FeedOutcome, FetchTicket, RefreshCause};
use crate::log_stream::{LogOutcome, LogStream, LogTicket};
use crate::notify::NotificationLevel;
use crate::plan::{PlanCoordinator, PlanResolution, PlanTicket};
use crate::state::{BackendHealth, ConsoleState};

/// A finished backend call.
enum Completion {
    Alerts {
        ticket: FetchTicket,
        result: relief_api::Result<Vec<Alert>>,
    },
    Plan {
        ticket: PlanTicket,
        result: relief_api::Result<Plan>,
    },
    Logs {
        ticket: LogTicket,
        result: relief_api::Result<Vec<LogRecord>>,
    },
    Health(relief_api::Result<HealthStatus>),
}

struct Delivery {
    generation: u64,
    completion: Completion,
}

/// Client-side coordination layer for the relief console.
pub struct Console {
    backend: Arc<dyn ReliefBackend>,
    handle: Handle,
    state: ConsoleState,
    feed: AlertFeed,
    plans: PlanCoordinator,
    log_stream: LogStream,
    alert_interval: Duration,
    log_interval: Duration,
    last_alert_poll: Option<Instant>,
    last_log_poll: Option<Instant>,
    health_requested: bool,
    health_pending: bool,
    tx: mpsc::UnboundedSender<Delivery>,
    rx: mpsc::UnboundedReceiver<Delivery>,
    generation: u64,
    disposed: bool,
    dirty: bool,
}

impl Console {
    /// Create a console. Work is spawned onto `handle`.
    pub fn new(backend: Arc<dyn ReliefBackend>, handle: Handle, config: &ConsoleConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        info!(
            base_url = backend.base_url(),
            alert_interval_secs = config.alert_poll_interval_secs,
            log_interval_secs = config.log_poll_interval_secs,
            plan_selection = ?config.plan_selection,
            "console created"
        );

        Self {
            backend,
            handle,
            state: ConsoleState::with_notification_ttl(config.notification_ttl()),
            feed: AlertFeed::new(),
            plans: PlanCoordinator::new(config.plan_selection),
            log_stream: LogStream::new(),
            alert_interval: config.alert_poll_interval(),
            log_interval: config.log_poll_interval(),
            last_alert_poll: None,
            last_log_poll: None,
            health_requested: false,
            health_pending: false,
            tx,
            rx,
            generation: 0,
            disposed: false,
            dirty: true,
        }
    }

    pub fn state(&self) -> &ConsoleState {
        &self.state
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn plan_selection(&self) -> PlanSelection {
        self.plans.policy()
    }

    /// Plan requests issued but not yet resolved.
    pub fn outstanding_plans(&self) -> usize {
        self.plans.outstanding()
    }

    /// Whether any backend call is still running.
    pub fn has_pending_work(&self) -> bool {
        self.feed.in_flight() > 0
            || self.plans.outstanding() > 0
            || self.log_stream.is_in_flight()
            || self.health_pending
    }

    /// Fire due timers and apply finished work.
    ///
    /// Call this regularly from the event loop. The first call starts both
    /// pollers and the health check immediately. Returns true if anything
    /// visible changed.
    pub fn poll_updates(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        let now = Instant::now();

        if !self.health_requested {
            self.check_health();
        }

        let alert_due = self
            .last_alert_poll
            .is_none_or(|t| now.duration_since(t) >= self.alert_interval);
        if alert_due {
            let cause = if self.last_alert_poll.is_none() {
                RefreshCause::Startup
            } else {
                RefreshCause::Timer
            };
            self.refresh_alerts(cause);
            self.last_alert_poll = Some(now);
        }

        let logs_due = self
            .last_log_poll
            .is_none_or(|t| now.duration_since(t) >= self.log_interval);
        if logs_due {
            self.poll_logs();
            self.last_log_poll = Some(now);
        }

        while let Ok(delivery) = self.rx.try_recv() {
            self.deliver(delivery);
        }

        if self.state.expire_notifications(now) {
            self.dirty = true;
        }

        std::mem::take(&mut self.dirty)
    }

    /// Wait for the next finished backend call and apply it.
    ///
    /// Returns false once the console is disposed and nothing else can arrive.
    pub async fn next_update(&mut self) -> bool {
        match self.rx.recv().await {
            Some(delivery) => {
                self.deliver(delivery);
                true
            }
            None => false,
        }
    }

    /// Start an alert fetch. Returns false if the trigger was skipped.
    pub fn refresh_alerts(&mut self, cause: RefreshCause) -> bool {
        if self.disposed {
            return false;
        }
        let Some(ticket) = self.feed.try_begin(cause) else {
            debug!(cause = cause.as_str(), "alert fetch already in flight, skipping");
            return false;
        };

        debug!(seq = ticket.seq, cause = cause.as_str(), "alert fetch started");
        self.state.begin_work();
        self.dirty = true;

        let backend = Arc::clone(&self.backend);
        self.spawn(async move {
            let result = backend.poll_alerts().await;
            Completion::Alerts { ticket, result }
        });
        true
    }

    /// Ask the backend for a plan for `alert_id`. Returns the request's
    /// sequence number, or `None` once disposed.
    ///
    /// Unknown ids are forwarded as-is.
    pub fn request_plan(&mut self, alert_id: &str) -> Option<u64> {
        if self.disposed {
            return None;
        }
        let ticket = self.plans.issue(alert_id);
        let seq = ticket.seq;
        log_plan_event!(alert_id, "issued", seq = seq);

        self.state.begin_work();
        self.state.plan_requested(alert_id);
        self.dirty = true;

        let backend = Arc::clone(&self.backend);
        self.spawn(async move {
            let result = backend.request_plan(&ticket.alert_id).await;
            Completion::Plan { ticket, result }
        });
        Some(seq)
    }

    /// Start a log fetch unless one is running.
    pub fn poll_logs(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        let Some(ticket) = self.log_stream.try_begin() else {
            return false;
        };

        let backend = Arc::clone(&self.backend);
        self.spawn(async move {
            let result = backend.fetch_logs().await;
            Completion::Logs { ticket, result }
        });
        true
    }

    /// Check `/api/health` once.
    pub fn check_health(&mut self) {
        if self.disposed {
            return;
        }
        self.health_requested = true;
        self.health_pending = true;

        let backend = Arc::clone(&self.backend);
        self.spawn(async move { Completion::Health(backend.health().await) });
    }

    /// Raise an operator notification.
    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.state.notify(level, message);
        self.dirty = true;
    }

    /// Dismiss the newest notification.
    pub fn dismiss_notification(&mut self) -> bool {
        let removed = self.state.dismiss_notification();
        self.dirty |= removed;
        removed
    }

    /// Tear down: stop polling and discard every result still in flight.
    ///
    /// Running requests are not cancelled; their completions are dropped.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.generation += 1;
        self.log_stream.stop();
        self.feed.reset();
        self.plans.reset();
        self.state.reset_work();
        self.health_pending = false;
        self.rx.close();
        info!("console disposed");
    }

    fn spawn<F>(&self, work: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        let tx = self.tx.clone();
        let generation = self.generation;
        self.handle.spawn(async move {
            let completion = work.await;
            // Send fails only after disposal closed the receiver.
            let _ = tx.send(Delivery {
                generation,
                completion,
            });
        });
    }

    fn deliver(&mut self, delivery: Delivery) {
        if self.disposed || delivery.generation != self.generation {
            debug!("discarding completion from a disposed console");
            return;
        }
        self.dirty = true;

        match delivery.completion {
            Completion::Alerts { ticket, result } => self.apply_alerts(ticket, result),
            Completion::Plan { ticket, result } => self.apply_plan(ticket, result),
            Completion::Logs { ticket, result } => self.apply_logs(ticket, result),
            Completion::Health(result) => self.apply_health(result),
        }
    }

    fn apply_alerts(&mut self, ticket: FetchTicket, result: relief_api::Result<Vec<Alert>>) {
        self.state.finish_work();

        match self.feed.complete(ticket, result) {
            FeedOutcome::Success(alerts) => {
                log_poll_event!(
                    "alerts",
                    "success",
                    seq = ticket.seq,
                    cause = ticket.cause.as_str(),
                    count = alerts.len()
                );
                self.state.replace_alerts(alerts);
            }
            FeedOutcome::Failure(e) => {
                warn!(seq = ticket.seq, error = %e, "alert poll failed, clearing alerts");
                log_poll_event!("alerts", "failure", seq = ticket.seq, error = %e);
                self.state.clear_alerts(e.friendly_message());
            }
            FeedOutcome::Stale => {
                debug!(seq = ticket.seq, "stale alert poll discarded");
            }
        }
    }

    fn apply_plan(&mut self, ticket: PlanTicket, result: relief_api::Result<Plan>) {
        self.state.finish_work();
        let resolution = self.plans.resolve(ticket, result);
        self.state
            .set_pending_plan(self.plans.latest_pending().map(str::to_string));

        match resolution {
            PlanResolution::Delivered { ticket, plan } => {
                log_plan_event!(
                    ticket.alert_id.as_str(),
                    "delivered",
                    seq = ticket.seq,
                    tasks = plan.tasks.len()
                );
                self.state.select_plan(ticket.alert_id, plan);
                // Best effort; the delivered plan stands whatever this returns.
                self.refresh_alerts(RefreshCause::AfterPlan);
            }
            PlanResolution::Rejected { ticket, rejection } => {
                log_plan_event!(
                    ticket.alert_id.as_str(),
                    "rejected",
                    seq = ticket.seq,
                    reason = rejection.reason()
                );
                self.state.reject_plan(&rejection);
            }
            PlanResolution::Superseded { ticket } => {
                log_plan_event!(ticket.alert_id.as_str(), "superseded", seq = ticket.seq);
            }
        }
    }

    fn apply_logs(&mut self, ticket: LogTicket, result: relief_api::Result<Vec<LogRecord>>) {
        match self.log_stream.complete(ticket, result) {
            LogOutcome::Replace(records) => {
                debug!(count = records.len(), "log poll applied");
                self.state.replace_logs(records);
            }
            LogOutcome::Clear(e) => {
                warn!(error = %e, "log poll failed, clearing logs");
                log_poll_event!("logs", "failure", error = %e);
                self.state.clear_logs();
            }
            LogOutcome::Discard => {}
        }
    }

    fn apply_health(&mut self, result: relief_api::Result<HealthStatus>) {
        self.health_pending = false;
        let health = match result {
            Ok(status) if status.is_ok() => BackendHealth::Up,
            Ok(status) => BackendHealth::Down(format!("status {}", status.status)),
            Err(e) => BackendHealth::Down(e.friendly_message()),
        };
        match &health {
            BackendHealth::Down(reason) => warn!(reason = %reason, "backend health check failed"),
            _ => info!("backend health check ok"),
        }
        self.state.set_health(health);
    }
}

impl Drop for Console {
    fn drop(&mut self) {
        self.dispose();
    }
}
