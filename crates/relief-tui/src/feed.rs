//! Alert feed poller state machine.
//!
//! Each poll cycle is `Idle -> Fetching -> {Success, Failure} -> Idle`. The
//! feed only decides *whether* a fetch may start and *how* a completion is
//! applied; the request itself is spawned by the console.
//!
//! Overlap rules:
//! - a timer trigger while a fetch is in flight is skipped
//! - startup, manual and post-plan triggers always start a fetch
//! - completions older than the newest applied one are discarded, so the
//!   collection always reflects the most recently issued successful poll

use relief_api::ApiError;
use relief_core::Alert;

/// Why a refresh was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshCause {
    /// First poll when the console starts
    Startup,
    /// Fixed-interval tick
    Timer,
    /// Operator pressed refresh
    Manual,
    /// A plan was delivered
    AfterPlan,
}

impl RefreshCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshCause::Startup => "startup",
            RefreshCause::Timer => "timer",
            RefreshCause::Manual => "manual",
            RefreshCause::AfterPlan => "after_plan",
        }
    }

    /// Whether this trigger is dropped while another fetch is in flight.
    pub fn skips_when_in_flight(&self) -> bool {
        matches!(self, RefreshCause::Timer)
    }
}

/// Feed phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    Idle,
    Fetching,
}

/// Handle for one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub cause: RefreshCause,
}

/// How a completed fetch should be applied to the console state.
#[derive(Debug)]
pub enum FeedOutcome {
    /// Replace the collection with this snapshot
    Success(Vec<Alert>),
    /// Clear the collection
    Failure(ApiError),
    /// A newer fetch already landed; ignore
    Stale,
}

/// Alert feed poller.
#[derive(Debug, Default)]
pub struct AlertFeed {
    next_seq: u64,
    last_applied: u64,
    in_flight: usize,
    successes: u64,
    failures: u64,
}

impl AlertFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> FeedPhase {
        if self.in_flight > 0 {
            FeedPhase::Fetching
        } else {
            FeedPhase::Idle
        }
    }

    /// Number of fetches currently outstanding.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Try to start a fetch. Returns `None` when the trigger is skipped.
    pub fn try_begin(&mut self, cause: RefreshCause) -> Option<FetchTicket> {
        if cause.skips_when_in_flight() && self.in_flight > 0 {
            return None;
        }
        self.next_seq += 1;
        self.in_flight += 1;
        Some(FetchTicket {
            seq: self.next_seq,
            cause,
        })
    }

    /// Finish a fetch and classify how its result applies.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: relief_api::Result<Vec<Alert>>,
    ) -> FeedOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);

        if ticket.seq < self.last_applied {
            return FeedOutcome::Stale;
        }
        self.last_applied = ticket.seq;

        match result {
            Ok(alerts) => {
                self.successes += 1;
                FeedOutcome::Success(alerts)
            }
            Err(e) => {
                self.failures += 1;
                FeedOutcome::Failure(e)
            }
        }
    }

    /// Forget in-flight fetches (their completions will be discarded elsewhere).
    pub fn reset(&mut self) {
        self.in_flight = 0;
    }

    /// (successes, failures) applied so far.
    pub fn stats(&self) -> (u64, u64) {
        (self.successes, self.failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_skipped_while_fetching() {
        let mut feed = AlertFeed::new();
        let first = feed.try_begin(RefreshCause::Startup).unwrap();
        assert_eq!(feed.phase(), FeedPhase::Fetching);

        assert!(feed.try_begin(RefreshCause::Timer).is_none());
        assert_eq!(feed.in_flight(), 1);

        feed.complete(first, Ok(vec![]));
        assert_eq!(feed.phase(), FeedPhase::Idle);
        assert!(feed.try_begin(RefreshCause::Timer).is_some());
    }

    #[test]
    fn test_manual_and_after_plan_always_start() {
        let mut feed = AlertFeed::new();
        feed.try_begin(RefreshCause::Timer).unwrap();
        assert!(feed.try_begin(RefreshCause::Manual).is_some());
        assert!(feed.try_begin(RefreshCause::AfterPlan).is_some());
        assert_eq!(feed.in_flight(), 3);
    }

    #[test]
    fn test_older_completion_is_stale() {
        let mut feed = AlertFeed::new();
        let older = feed.try_begin(RefreshCause::Timer).unwrap();
        let newer = feed.try_begin(RefreshCause::Manual).unwrap();

        let applied = feed.complete(newer, Ok(vec![Alert::new("A2", "fire", "Ooty")]));
        assert!(matches!(applied, FeedOutcome::Success(ref a) if a.len() == 1));

        let late = feed.complete(older, Err(ApiError::RequestFailed("timeout".into())));
        assert!(matches!(late, FeedOutcome::Stale));
        assert_eq!(feed.phase(), FeedPhase::Idle);
        assert_eq!(feed.stats(), (1, 0));
    }

    #[test]
    fn test_failure_outcome() {
        let mut feed = AlertFeed::new();
        let ticket = feed.try_begin(RefreshCause::Startup).unwrap();
        let outcome = feed.complete(ticket, Err(ApiError::from_http_status(502, "bad gateway")));
        assert!(matches!(outcome, FeedOutcome::Failure(ref e) if e.status() == Some(502)));
        assert_eq!(feed.stats(), (0, 1));
    }
}
