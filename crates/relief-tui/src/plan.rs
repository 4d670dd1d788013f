//! Plan request coordinator.
//!
//! Each request is `Idle -> Requesting -> {Delivered, Rejected} -> Idle`.
//! Requests may overlap; every issued request gets a monotonically
//! increasing sequence number and the [`PlanSelection`] policy decides which
//! completions are allowed to change the selected plan:
//!
//! - [`PlanSelection::LatestIssued`]: a completion applies only if its
//!   sequence number is higher than every completion applied before it.
//!   A slow earlier request can never overwrite a later one.
//! - [`PlanSelection::LatestResolved`]: every completion applies, so the last
//!   request to resolve wins regardless of issue order.

use std::collections::BTreeMap;

use relief_api::ApiError;
use relief_core::{Plan, PlanSelection};

/// Handle for one issued plan request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanTicket {
    pub seq: u64,
    pub alert_id: String,
}

/// Why a plan request was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanRejection {
    /// The request never completed
    RequestFailed(String),
    /// The server answered with a non-success status
    ServerStatus { status: u16, message: String },
    /// The body was not a usable plan
    InvalidResponse(String),
}

impl PlanRejection {
    /// Classify a backend error.
    pub fn from_error(err: &ApiError) -> Self {
        match err {
            ApiError::RequestFailed(msg) => PlanRejection::RequestFailed(msg.clone()),
            ApiError::ConfigError(msg) => PlanRejection::RequestFailed(msg.clone()),
            ApiError::Status { status, .. } => PlanRejection::ServerStatus {
                status: *status,
                message: err.friendly_message(),
            },
            ApiError::InvalidResponse { message, .. } => {
                PlanRejection::InvalidResponse(message.clone())
            }
        }
    }

    /// Short machine-friendly reason.
    pub fn reason(&self) -> &'static str {
        match self {
            PlanRejection::RequestFailed(_) => "request failed",
            PlanRejection::ServerStatus { .. } => "server status",
            PlanRejection::InvalidResponse(_) => "invalid response",
        }
    }

    /// Operator-facing text.
    pub fn notification_text(&self) -> String {
        match self {
            PlanRejection::RequestFailed(msg) => format!("Plan request failed: {msg}"),
            PlanRejection::ServerStatus { status, message } => {
                format!("Plan request failed: {message} (HTTP {status})")
            }
            PlanRejection::InvalidResponse(_) => {
                "Plan creation failed: no plan returned. Check backend logs.".to_string()
            }
        }
    }
}

/// How a resolved request affects the selected plan.
#[derive(Debug)]
pub enum PlanResolution {
    /// Select this plan
    Delivered { ticket: PlanTicket, plan: Plan },
    /// Clear the selection and notify the operator
    Rejected {
        ticket: PlanTicket,
        rejection: PlanRejection,
    },
    /// A newer request already resolved; nothing changes
    Superseded { ticket: PlanTicket },
}

/// Coordinator phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanPhase {
    Idle,
    Requesting,
}

/// Plan request coordinator.
#[derive(Debug)]
pub struct PlanCoordinator {
    policy: PlanSelection,
    next_seq: u64,
    last_applied: u64,
    outstanding: BTreeMap<u64, String>,
}

impl Default for PlanCoordinator {
    fn default() -> Self {
        Self::new(PlanSelection::default())
    }
}

impl PlanCoordinator {
    pub fn new(policy: PlanSelection) -> Self {
        Self {
            policy,
            next_seq: 0,
            last_applied: 0,
            outstanding: BTreeMap::new(),
        }
    }

    pub fn policy(&self) -> PlanSelection {
        self.policy
    }

    pub fn phase(&self) -> PlanPhase {
        if self.outstanding.is_empty() {
            PlanPhase::Idle
        } else {
            PlanPhase::Requesting
        }
    }

    /// Number of requests issued but not yet resolved.
    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    /// Alert id of the most recently issued unresolved request.
    pub fn latest_pending(&self) -> Option<&str> {
        self.outstanding.values().next_back().map(String::as_str)
    }

    /// Issue a request for `alert_id`. The id is not validated.
    pub fn issue(&mut self, alert_id: impl Into<String>) -> PlanTicket {
        self.next_seq += 1;
        let alert_id = alert_id.into();
        self.outstanding.insert(self.next_seq, alert_id.clone());
        PlanTicket {
            seq: self.next_seq,
            alert_id,
        }
    }

    /// Resolve an issued request.
    pub fn resolve(&mut self, ticket: PlanTicket, result: relief_api::Result<Plan>) -> PlanResolution {
        self.outstanding.remove(&ticket.seq);

        if self.policy == PlanSelection::LatestIssued && ticket.seq < self.last_applied {
            return PlanResolution::Superseded { ticket };
        }
        self.last_applied = self.last_applied.max(ticket.seq);

        match result {
            Ok(plan) => PlanResolution::Delivered { ticket, plan },
            Err(e) => PlanResolution::Rejected {
                rejection: PlanRejection::from_error(&e),
                ticket,
            },
        }
    }

    /// Forget outstanding requests.
    pub fn reset(&mut self) {
        self.outstanding.clear();
    }
}
