//! Monocle - live dashboard synchronization client for uptime monitoring.
//!
//! Monocle keeps a client-side view of one project's monitors fresh by
//! combining two paths:
//! - a pull path: HTTP dashboard fetches with cooldown-based coalescing
//! - a push path: a websocket event channel with bounded reconnection
//!
//! Architecture:
//! - `sync::channel` owns a single websocket connection per project
//! - `sync::reconnect` is the pure backoff decision logic
//! - `sync::refresh` coalesces refresh triggers into bounded fetches
//! - `sync::session` composes the three into one per-project session
//!
//! The CLI (`monocle watch <project-id>`) is a thin consumer of the
//! session's watchable state.

pub mod api;
pub mod cli;
pub mod config;
pub mod models;
pub mod sync;
