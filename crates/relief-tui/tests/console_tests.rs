//! Console coordination tests against a scripted backend.
//!
//! Each backend call can be held open with a oneshot channel so tests decide
//! the order in which responses land.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use relief_api::{ApiError, ReliefBackend};
use relief_core::{Alert, ConsoleConfig, HealthStatus, LogRecord, Plan, PlanSelection};
use relief_tui::state::FeedStatus;
use relief_tui::{BackendHealth, Console, RefreshCause};
use serde_json::json;
use tokio::runtime::Handle;
use tokio::sync::oneshot;

type Reply<T> = oneshot::Receiver<relief_api::Result<T>>;

#[derive(Default)]
struct ScriptedBackend {
    alerts: Mutex<VecDeque<Reply<Vec<Alert>>>>,
    /// Returned when no alert reply is scripted
    default_alerts: Mutex<Vec<Alert>>,
    plans: Mutex<HashMap<String, VecDeque<Reply<Plan>>>>,
    logs: Mutex<VecDeque<Reply<Vec<LogRecord>>>>,
    alert_calls: AtomicUsize,
    plan_calls: AtomicUsize,
    log_calls: AtomicUsize,
    health_calls: AtomicUsize,
}

impl ScriptedBackend {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn set_default_alerts(&self, alerts: Vec<Alert>) {
        *self.default_alerts.lock().unwrap() = alerts;
    }

    /// Queue an alert reply the test resolves later.
    fn hold_alerts(&self) -> oneshot::Sender<relief_api::Result<Vec<Alert>>> {
        let (tx, rx) = oneshot::channel();
        self.alerts.lock().unwrap().push_back(rx);
        tx
    }

    fn push_alerts(&self, result: relief_api::Result<Vec<Alert>>) {
        let _ = self.hold_alerts().send(result);
    }

    fn hold_plan(&self, alert_id: &str) -> oneshot::Sender<relief_api::Result<Plan>> {
        let (tx, rx) = oneshot::channel();
        self.plans
            .lock()
            .unwrap()
            .entry(alert_id.to_string())
            .or_default()
            .push_back(rx);
        tx
    }

    fn push_plan(&self, alert_id: &str, result: relief_api::Result<Plan>) {
        let _ = self.hold_plan(alert_id).send(result);
    }

    fn push_logs(&self, result: relief_api::Result<Vec<LogRecord>>) {
        let (tx, rx) = oneshot::channel();
        self.logs.lock().unwrap().push_back(rx);
        let _ = tx.send(result);
    }

    fn alert_calls(&self) -> usize {
        self.alert_calls.load(Ordering::SeqCst)
    }
}

async fn await_reply<T>(reply: Option<Reply<T>>, fallback: relief_api::Result<T>) -> relief_api::Result<T> {
    match reply {
        Some(rx) => rx
            .await
            .unwrap_or_else(|_| Err(ApiError::RequestFailed("script dropped".into()))),
        None => fallback,
    }
}

#[async_trait]
impl ReliefBackend for ScriptedBackend {
    async fn poll_alerts(&self) -> relief_api::Result<Vec<Alert>> {
        self.alert_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.alerts.lock().unwrap().pop_front();
        let fallback = Ok(self.default_alerts.lock().unwrap().clone());
        await_reply(reply, fallback).await
    }

    async fn request_plan(&self, alert_id: &str) -> relief_api::Result<Plan> {
        self.plan_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .plans
            .lock()
            .unwrap()
            .get_mut(alert_id)
            .and_then(VecDeque::pop_front);
        await_reply(reply, Err(ApiError::from_http_status(404, "Alert not found"))).await
    }

    async fn fetch_logs(&self) -> relief_api::Result<Vec<LogRecord>> {
        self.log_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.logs.lock().unwrap().pop_front();
        await_reply(reply, Ok(Vec::new())).await
    }

    async fn health(&self) -> relief_api::Result<HealthStatus> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        Ok(HealthStatus {
            status: "ok".into(),
            time: Some("2026-10-18T08:00:00Z".into()),
        })
    }

    fn base_url(&self) -> &str {
        "http://scripted.test"
    }
}

/// Config with timers long enough that only explicit calls start work.
fn quiet_config() -> ConsoleConfig {
    ConsoleConfig {
        alert_poll_interval_secs: 3600,
        log_poll_interval_secs: 3600,
        ..ConsoleConfig::default()
    }
}

fn console_with(backend: &Arc<ScriptedBackend>, config: &ConsoleConfig) -> Console {
    Console::new(Arc::clone(backend) as Arc<dyn ReliefBackend>, Handle::current(), config)
}

fn plan_body(body: serde_json::Value) -> Plan {
    serde_json::from_value(body).unwrap()
}

/// Apply completions until `done` holds.
async fn until(console: &mut Console, done: impl Fn(&Console) -> bool) {
    while !done(console) {
        let delivered = tokio::time::timeout(Duration::from_secs(2), console.next_update())
            .await
            .expect("timed out waiting for console update");
        assert!(delivered, "console closed before condition held");
    }
}

fn alert_ids(console: &Console) -> Vec<String> {
    console
        .state()
        .alerts()
        .iter()
        .map(|scored| scored.alert.id.clone())
        .collect()
}

#[tokio::test]
async fn test_first_poll_starts_feed_logs_and_health() {
    let backend = ScriptedBackend::new();
    backend.set_default_alerts(vec![Alert::new("A1", "flood", "Chennai")]);
    let mut console = console_with(&backend, &quiet_config());

    console.poll_updates();
    assert!(console.state().is_busy());
    assert!(console.has_pending_work());

    until(&mut console, |c| !c.has_pending_work()).await;

    assert_eq!(backend.alert_calls(), 1);
    assert_eq!(backend.log_calls.load(Ordering::SeqCst), 1);
    assert_eq!(backend.health_calls.load(Ordering::SeqCst), 1);
    assert_eq!(alert_ids(&console), ["A1"]);
    assert!(console.state().feed_status().is_live());
    assert_eq!(console.state().health(), &BackendHealth::Up);
    assert!(!console.state().is_busy());

    // Timers are not due yet; nothing new starts.
    console.poll_updates();
    assert!(!console.has_pending_work());
}

/// Wait until the backend has seen `n` calls on `counter`.
async fn calls_reach(counter: &AtomicUsize, n: usize) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while counter.load(Ordering::SeqCst) < n {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("backend call never started");
}

/// Apply whatever has finished without waiting on held calls.
///
/// `poll_updates` fires timers before draining, so tests drain first.
async fn drain(console: &mut Console) {
    tokio::time::sleep(Duration::from_millis(50)).await;
    console.poll_updates();
}

/// Sleep just past a one second poll interval.
async fn pass_interval() {
    tokio::time::sleep(Duration::from_millis(1100)).await;
}

#[tokio::test]
async fn test_alert_timer_fires_and_skips_while_in_flight() {
    let backend = ScriptedBackend::new();
    let config = ConsoleConfig {
        alert_poll_interval_secs: 1,
        log_poll_interval_secs: 3600,
        ..ConsoleConfig::default()
    };
    let mut console = console_with(&backend, &config);

    console.poll_updates();
    until(&mut console, |c| !c.has_pending_work()).await;
    assert_eq!(backend.alert_calls(), 1);

    // Before the interval elapses nothing new starts.
    console.poll_updates();
    assert!(!console.has_pending_work());

    let release = backend.hold_alerts();
    pass_interval().await;
    console.poll_updates();
    assert!(console.has_pending_work());
    calls_reach(&backend.alert_calls, 2).await;

    // Due again, but the held fetch is still out.
    pass_interval().await;
    console.poll_updates();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(backend.alert_calls(), 2);

    let _ = release.send(Ok(vec![Alert::new("A9", "cyclone", "Puri")]));
    until(&mut console, |c| !c.has_pending_work()).await;
    assert_eq!(alert_ids(&console), ["A9"]);
    assert_eq!(backend.log_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_log_timer_runs_independently_of_alert_feed() {
    let backend = ScriptedBackend::new();
    let config = ConsoleConfig {
        alert_poll_interval_secs: 3600,
        log_poll_interval_secs: 1,
        ..ConsoleConfig::default()
    };
    let mut console = console_with(&backend, &config);

    // Startup alert fetch stays open for the whole test.
    let release = backend.hold_alerts();
    console.poll_updates();
    calls_reach(&backend.log_calls, 1).await;
    drain(&mut console).await;

    pass_interval().await;
    console.poll_updates();
    calls_reach(&backend.log_calls, 2).await;
    drain(&mut console).await;

    pass_interval().await;
    console.poll_updates();
    calls_reach(&backend.log_calls, 3).await;
    assert_eq!(backend.alert_calls(), 1);

    let _ = release.send(Ok(Vec::new()));
    until(&mut console, |c| !c.has_pending_work()).await;
    assert_eq!(backend.alert_calls(), 1);
}

#[tokio::test]
async fn test_failed_poll_empties_alerts() {
    let backend = ScriptedBackend::new();
    let mut console = console_with(&backend, &quiet_config());

    backend.push_alerts(Ok(vec![
        Alert::new("A1", "flood", "Chennai").with_confidence(0.8),
        Alert::new("A2", "quake", "Shimla"),
    ]));
    assert!(console.refresh_alerts(RefreshCause::Manual));
    until(&mut console, |c| c.state().alerts().len() == 2).await;
    assert!((console.state().alerts()[1].risk - 0.15).abs() < 1e-9);

    backend.push_alerts(Err(ApiError::from_http_status(500, "boom")));
    assert!(console.refresh_alerts(RefreshCause::Manual));
    until(&mut console, |c| !c.has_pending_work()).await;

    assert!(console.state().alerts().is_empty());
    match console.state().feed_status() {
        FeedStatus::Unavailable { reason, .. } => assert!(reason.contains("500")),
        other => panic!("expected unavailable feed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_delivered_plan_is_selected_and_alerts_refreshed() {
    let backend = ScriptedBackend::new();
    let mut console = console_with(&backend, &quiet_config());

    backend.push_plan(
        "A1",
        Ok(plan_body(json!({
            "risk": 0.7,
            "tasks": [{"task": "evacuate"}],
            "assignment": {"team1": "zoneA"}
        }))),
    );
    assert_eq!(console.request_plan("A1"), Some(1));
    assert_eq!(console.state().pending_plan(), Some("A1"));

    until(&mut console, |c| c.state().plan().is_some()).await;
    let selected = console.state().plan().unwrap();
    assert_eq!(selected.alert_id, "A1");
    assert_eq!(selected.plan.server_risk(), 0.7);
    assert_eq!(selected.plan.tasks.len(), 1);
    assert_eq!(selected.plan.tasks[0].label(), "evacuate");
    assert_eq!(selected.plan.assignment, Some(json!({"team1": "zoneA"})));
    assert_eq!(console.state().pending_plan(), None);

    until(&mut console, |c| !c.has_pending_work()).await;
    assert_eq!(backend.alert_calls(), 1, "delivery should trigger one alert refresh");
}

#[tokio::test]
async fn test_invalid_plan_clears_selection_and_notifies() {
    let backend = ScriptedBackend::new();
    backend.set_default_alerts(vec![Alert::new("A1", "flood", "Chennai")]);
    let mut console = console_with(&backend, &quiet_config());

    console.refresh_alerts(RefreshCause::Manual);
    backend.push_plan("A1", Ok(plan_body(json!({"risk": 0.4, "tasks": []}))));
    console.request_plan("A1");
    until(&mut console, |c| !c.has_pending_work() && c.state().plan().is_some()).await;
    let calls_before = backend.alert_calls();

    backend.push_plan(
        "A1",
        Err(ApiError::invalid_response("/api/plan/A1", "expected a JSON object, got null")),
    );
    console.request_plan("A1");
    until(&mut console, |c| !c.has_pending_work()).await;

    assert!(console.state().plan().is_none());
    assert_eq!(alert_ids(&console), ["A1"]);
    assert_eq!(backend.alert_calls(), calls_before, "rejection must not refresh alerts");
    let note = console.state().notifications().current().unwrap();
    assert_eq!(
        note.message,
        "Plan creation failed: no plan returned. Check backend logs."
    );
}

#[tokio::test]
async fn test_unknown_alert_reports_server_status() {
    let backend = ScriptedBackend::new();
    let mut console = console_with(&backend, &quiet_config());

    console.request_plan("nope");
    until(&mut console, |c| !c.has_pending_work()).await;
    assert_eq!(backend.plan_calls.load(Ordering::SeqCst), 1);

    assert!(console.state().plan().is_none());
    let note = console.state().notifications().current().unwrap();
    assert!(note.message.starts_with("Plan request failed"));
    assert!(note.message.contains("HTTP 404"));
}

#[tokio::test]
async fn test_latest_resolved_lets_slow_earlier_request_win() {
    let backend = ScriptedBackend::new();
    let config = quiet_config().with_plan_selection(PlanSelection::LatestResolved);
    let mut console = console_with(&backend, &config);

    let first = backend.hold_plan("A1");
    let second = backend.hold_plan("A2");
    console.request_plan("A1");
    console.request_plan("A2");
    assert_eq!(console.outstanding_plans(), 2);

    second.send(Ok(plan_body(json!({"risk": 0.2})))).unwrap();
    until(&mut console, |c| c.state().plan().is_some()).await;
    assert_eq!(console.state().plan().unwrap().alert_id, "A2");

    first.send(Ok(plan_body(json!({"risk": 0.9})))).unwrap();
    until(&mut console, |c| {
        c.state().plan().is_some_and(|p| p.alert_id == "A1")
    })
    .await;
    assert_eq!(console.outstanding_plans(), 0);
}

#[tokio::test]
async fn test_latest_issued_ignores_superseded_response() {
    let backend = ScriptedBackend::new();
    let mut console = console_with(&backend, &quiet_config());
    assert_eq!(console.plan_selection(), PlanSelection::LatestIssued);

    let first = backend.hold_plan("A1");
    let second = backend.hold_plan("A2");
    console.request_plan("A1");
    console.request_plan("A2");

    second.send(Ok(plan_body(json!({"risk": 0.2})))).unwrap();
    until(&mut console, |c| c.state().plan().is_some()).await;

    // A late failure for the older request is dropped as well.
    first
        .send(Err(ApiError::RequestFailed("connection reset".into())))
        .unwrap();
    until(&mut console, |c| !c.has_pending_work()).await;

    assert_eq!(console.state().plan().unwrap().alert_id, "A2");
    assert!(console.state().notifications().is_empty());
}

#[tokio::test]
async fn test_stale_alert_poll_is_discarded() {
    let backend = ScriptedBackend::new();
    let mut console = console_with(&backend, &quiet_config());

    let slow = backend.hold_alerts();
    let fast = backend.hold_alerts();
    assert!(console.refresh_alerts(RefreshCause::Manual));
    assert!(console.refresh_alerts(RefreshCause::Manual));

    fast.send(Ok(vec![Alert::new("B", "fire", "Pune")])).unwrap();
    until(&mut console, |c| !c.state().alerts().is_empty()).await;

    slow.send(Ok(vec![Alert::new("A", "flood", "Surat")])).unwrap();
    until(&mut console, |c| !c.has_pending_work()).await;
    assert_eq!(alert_ids(&console), ["B"]);
}

#[tokio::test]
async fn test_timer_refresh_skipped_while_fetch_in_flight() {
    let backend = ScriptedBackend::new();
    let mut console = console_with(&backend, &quiet_config());

    let held = backend.hold_alerts();
    assert!(console.refresh_alerts(RefreshCause::Timer));
    assert!(!console.refresh_alerts(RefreshCause::Timer));
    assert!(console.refresh_alerts(RefreshCause::Manual));

    held.send(Ok(Vec::new())).unwrap();
    until(&mut console, |c| !c.has_pending_work()).await;
    assert_eq!(backend.alert_calls(), 2);
}

#[tokio::test]
async fn test_busy_indicator_tracks_outstanding_work() {
    let backend = ScriptedBackend::new();
    let mut console = console_with(&backend, &quiet_config());
    assert!(!console.state().is_busy());

    let alerts = backend.hold_alerts();
    let plan = backend.hold_plan("A1");
    console.refresh_alerts(RefreshCause::Manual);
    console.request_plan("A1");
    assert_eq!(console.state().busy_count(), 2);

    alerts.send(Ok(Vec::new())).unwrap();
    until(&mut console, |c| c.state().busy_count() == 1).await;
    assert!(console.state().is_busy());

    plan.send(Err(ApiError::RequestFailed("refused".into()))).unwrap();
    until(&mut console, |c| !c.has_pending_work()).await;
    assert!(!console.state().is_busy());
}

#[tokio::test]
async fn test_log_failure_clears_records() {
    let backend = ScriptedBackend::new();
    let mut console = console_with(&backend, &quiet_config());

    backend.push_logs(Ok(vec![
        LogRecord(json!({"msg": "alert A1 ingested"})),
        LogRecord(json!("raw line")),
    ]));
    assert!(console.poll_logs());
    assert!(!console.poll_logs(), "second log poll must wait for the first");
    until(&mut console, |c| c.state().logs().len() == 2).await;
    assert_eq!(console.state().logs()[1], LogRecord(json!("raw line")));

    backend.push_logs(Err(ApiError::RequestFailed("timeout".into())));
    assert!(console.poll_logs());
    until(&mut console, |c| !c.has_pending_work()).await;
    assert!(console.state().logs().is_empty());
}

#[tokio::test]
async fn test_dispose_discards_late_results() {
    let backend = ScriptedBackend::new();
    let mut console = console_with(&backend, &quiet_config());

    let plan = backend.hold_plan("A1");
    let alerts = backend.hold_alerts();
    console.request_plan("A1");
    console.refresh_alerts(RefreshCause::Manual);

    console.dispose();
    assert!(console.is_disposed());
    assert!(!console.state().is_busy());
    assert!(!console.refresh_alerts(RefreshCause::Manual));
    assert_eq!(console.request_plan("A2"), None);
    assert!(!console.poll_logs());

    // The sends may fail if the tasks already observed the closed channel.
    let _ = plan.send(Ok(plan_body(json!({"risk": 0.5}))));
    let _ = alerts.send(Ok(vec![Alert::new("A1", "flood", "Chennai")]));

    let drained = tokio::time::timeout(Duration::from_secs(2), async {
        while console.next_update().await {}
    })
    .await;
    assert!(drained.is_ok(), "disposed console should stop delivering");

    assert!(console.state().plan().is_none());
    assert!(console.state().alerts().is_empty());
    assert!(!console.poll_updates());
}
