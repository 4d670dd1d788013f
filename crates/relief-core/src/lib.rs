//! # relief-core
//!
//! Core types, errors, and utilities for the relief console.
//!
//! This crate provides:
//! - [`types`] - Alert, plan and log records as served by the backend
//! - [`risk`] - The client-side risk estimator and risk tiers
//! - [`config`] - Console configuration resolution
//! - [`ReliefError`] - Error type for local console operations
//! - [`logging`] - Tracing setup
//!
//! ## Example
//!
//! ```
//! use relief_core::{Alert, risk};
//!
//! let alert = Alert::new("A1", "flood", "Chennai")
//!     .with_confidence(0.8)
//!     .with_severity("high");
//! assert_eq!(risk::badge(risk::estimate_risk(&alert)), "High (72%)");
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod risk;
pub mod types;

// Re-export main types for convenience
pub use config::{ConsoleConfig, PlanSelection};
pub use error::{ReliefError, Result};
pub use logging::{LogGuard, init_logging};
pub use risk::{RiskTier, ScoredAlert, estimate_risk};
pub use types::{Alert, HealthStatus, LogRecord, LogsEnvelope, Plan, PlanTask, Severity};
