//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use std::env;

/// Which processing path handles submitted requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// The built-in scripted conversation
    Native,
    /// Pass-through to an external AutoGen backend
    Autogen,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Processing backend configuration
    pub backend: BackendConfig,
    /// Simulation timing configuration
    pub simulation: SimulationConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
}

/// Processing backend configuration
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Selected processing path
    pub kind: BackendKind,
    /// Base URL of the external backend's HTTP surface
    pub autogen_base_url: String,
    /// URL of the external backend's push channel
    pub autogen_ws_url: String,
}

/// Simulation timing configuration
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Multiplier applied to the scripted delays (0.0 runs instantly)
    pub delay_scale: f64,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let kind = match env::var("COLLAB_BACKEND").as_deref() {
            Ok("autogen") => BackendKind::Autogen,
            _ => BackendKind::Native,
        };
        Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            },
            backend: BackendConfig {
                kind,
                autogen_base_url: env::var("AUTOGEN_URL")
                    .unwrap_or_else(|_| "http://127.0.0.1:8000".to_string()),
                autogen_ws_url: env::var("AUTOGEN_WS_URL")
                    .unwrap_or_else(|_| "ws://127.0.0.1:8000/ws".to_string()),
            },
            simulation: SimulationConfig {
                delay_scale: env::var("SIM_DELAY_SCALE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1.0),
            },
        }
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
