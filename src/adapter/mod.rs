//! External-framework adapter
//!
//! Proxies requests to an external AutoGen backend and maps its output
//! into this system's data shapes. The HTTP side handles the readiness
//! probe and conversation creation; agent activity flows back over the
//! push channel.

pub mod channel;
pub mod client;

pub use channel::{spawn_push_channel, ReconnectConfig};
pub use client::{AutogenClient, BackendStatus};
