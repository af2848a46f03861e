//! sync-server
//!
//! Websocket relay for synchronized screen playback: one central task
//! owns the registry, every connection gets its own I/O tasks.

pub mod config;
pub mod types;
pub mod server;

// these are internal modules, not re-exported
mod client;
mod health;
mod relay_task;

pub use client::{CLOSE_CODE_EVICTED, CLOSE_CODE_SHUTDOWN};
