//! Agent Collaboration Backend Library
//!
//! This library exposes modules for testing and external use.
//! The main binary is in `src/main.rs`.

pub mod adapter;
pub mod api;
pub mod classify;
pub mod config;
pub mod error;
pub mod service;
pub mod simulation;
/// Application state management
///
/// Domain records, the in-memory store/notifier, and the agent roster.
pub mod state;
pub mod websocket;
