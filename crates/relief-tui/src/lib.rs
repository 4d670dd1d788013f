//! Terminal console for disaster relief operators.
//!
//! This crate provides the client-side coordination layer ([`Console`]) and
//! the Ratatui interface built on top of it.
//!
//! ## Features
//!
//! - Periodic alert polling with per-alert risk estimates
//! - Map of located alerts colored by risk tier
//! - On-demand response plans with stale-response fencing
//! - Live coordinator log stream
//!
//! ## Hotkeys
//!
//! - `o` - Overview
//! - `a` - Alerts view
//! - `m` - Map view
//! - `p` - Plan view
//! - `l` - Logs view
//! - `Enter` - Request a plan for the selected alert or marker
//! - `r` - Refresh alerts now
//! - `x` - Dismiss notification
//! - `?` or `h` - Help
//! - `q` - Quit
//! - `Tab` - Cycle views

pub mod alert_panel;
pub mod app;
pub mod console;
pub mod event;
pub mod feed;
pub mod log_panel;
pub mod log_stream;
pub mod map_panel;
pub mod notify;
pub mod plan;
pub mod plan_panel;
pub mod state;
pub mod theme;
pub mod view;

pub use app::{App, AppResult};
pub use console::Console;
pub use feed::RefreshCause;
pub use plan::{PlanRejection, PlanResolution};
pub use state::{BackendHealth, ConsoleState, FeedStatus, SelectedPlan};
pub use view::View;
