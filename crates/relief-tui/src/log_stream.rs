//! Log stream poller.
//!
//! Polls `/api/logs` on its own cadence. Success replaces the local records
//! in received order, failure empties them, and the next tick is the only
//! retry. Once stopped, no further fetch starts and late results are dropped.

use relief_api::ApiError;
use relief_core::LogRecord;

/// Handle for one issued log fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogTicket {
    pub seq: u64,
}

/// How a completed log fetch applies.
#[derive(Debug)]
pub enum LogOutcome {
    Replace(Vec<LogRecord>),
    Clear(ApiError),
    /// Stopped, or a newer fetch already landed
    Discard,
}

#[derive(Debug, Default)]
pub struct LogStream {
    next_seq: u64,
    last_applied: u64,
    in_flight: bool,
    stopped: bool,
}

impl LogStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch unless one is already running or the stream is stopped.
    pub fn try_begin(&mut self) -> Option<LogTicket> {
        if self.stopped || self.in_flight {
            return None;
        }
        self.next_seq += 1;
        self.in_flight = true;
        Some(LogTicket { seq: self.next_seq })
    }

    pub fn complete(
        &mut self,
        ticket: LogTicket,
        result: relief_api::Result<Vec<LogRecord>>,
    ) -> LogOutcome {
        if ticket.seq == self.next_seq {
            self.in_flight = false;
        }
        if self.stopped || ticket.seq <= self.last_applied {
            return LogOutcome::Discard;
        }
        self.last_applied = ticket.seq;

        match result {
            Ok(records) => LogOutcome::Replace(records),
            Err(e) => LogOutcome::Clear(e),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Stop polling for good.
    pub fn stop(&mut self) {
        self.stopped = true;
        self.in_flight = false;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}
