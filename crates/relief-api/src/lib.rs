//! # relief-api
//!
//! HTTP client for the disaster relief coordinator backend.
//!
//! This crate provides:
//! - [`ReliefBackend`] - The backend contracts the console depends on
//! - [`HttpBackend`] - reqwest implementation of those contracts
//! - [`ApiError`] - Failure taxonomy for backend calls
//!
//! ## Endpoints
//!
//! - `GET /api/poll_alerts` - current alert set
//! - `POST /api/plan/{alert_id}` - generate a response plan
//! - `GET /api/logs` - recent coordinator log records
//! - `GET /api/health` - liveness check
//!
//! ## Example
//!
//! ```no_run
//! use relief_api::{HttpBackend, ReliefBackend};
//!
//! #[tokio::main]
//! async fn main() -> relief_api::Result<()> {
//!     let backend = HttpBackend::new("http://localhost:8000", None)?;
//!     for record in backend.fetch_logs().await? {
//!         println!("{}", record.dump());
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;

pub use client::{HttpBackend, ReliefBackend, parse_plan};
pub use error::{ApiError, Result};
