//! Update-check service layer
//!
//! This module runs the update checks and delivers their results to the host.
//!
//! # Modules
//!
//! - [`events`]: Events and status pushed to the host (`EventSink`)
//! - [`resolver`]: One complete check of all installed apps against the catalogs
//! - [`scheduler`]: Run guard and the daily wall-clock timer

pub mod events;
pub mod resolver;
pub mod scheduler;
