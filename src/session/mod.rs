//! Focus session lifecycle.
//!
//! - [`SessionController`] validates start requests and requests resets
//! - [`SessionWorker`] launches the applications, locks the desktop, runs the
//!   focus and break segments and restores everything at the end
//! - [`SessionEvent`] carries progress from the worker to the front end
//!
//! The worker and the UI thread share one [`Session`](crate::types::Session)
//! behind a mutex. Reset works by clearing `is_active`; the worker notices
//! within one poll interval and tears down.

mod controller;
mod error;
mod event;
pub mod schedule;
mod worker;

pub use controller::{build_config, SessionController};
pub use error::SessionError;
pub use event::{EndReason, SessionEvent};
pub use worker::{restore_desktop, toggle_player, SessionTiming, SessionWorker};
