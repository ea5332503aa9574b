//! Agent Collaboration Backend
//!
//! A REST API and WebSocket server that drives a simulated four-agent
//! collaboration workflow and streams every state change to the dashboard.

use agent_collab_backend::{adapter, api, config, service, simulation, state, websocket};

use api::ApiState;
use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use config::{BackendKind, Config};
use service::CollabService;
use simulation::TokioDelay;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// Request ID middleware - adds unique ID to each request for tracing
async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    let response = next.run(request).instrument(span).await;

    let duration = start.elapsed();
    info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = %response.status().as_u16(),
        duration_ms = duration.as_millis(),
        "Request completed"
    );

    response
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load configuration
    let config = Config::from_env();
    info!("Configuration loaded: {:?}", config);

    // Initialize the shared store and the processing service
    let store = state::shared_store();
    let delay = Arc::new(TokioDelay::scaled(config.simulation.delay_scale));

    let service = match config.backend.kind {
        BackendKind::Native => Arc::new(CollabService::native(store.clone(), delay)),
        BackendKind::Autogen => {
            let client = Arc::new(adapter::AutogenClient::new(
                reqwest::Client::new(),
                config.backend.autogen_base_url.clone(),
            ));
            // Inbound agent activity arrives over the push channel
            adapter::spawn_push_channel(
                config.backend.autogen_ws_url.clone(),
                store.clone(),
                adapter::ReconnectConfig::default(),
            );
            Arc::new(CollabService::with_adapter(store.clone(), delay, client))
        }
    };

    let api_state = ApiState::new(service, state::default_agents(), config.backend.kind);

    // Build our application with routes
    let app = Router::new()
        .route("/", get(api::handlers::root))
        .route("/api/health", get(api::handlers::health_check))
        .route("/status", get(api::handlers::status))
        // Collaboration API
        .route("/api/agents", get(api::handlers::list_agents))
        .route("/api/request", post(api::handlers::submit_request))
        .route("/api/requests/:id", get(api::handlers::get_request))
        .route("/api/snapshot", get(api::handlers::snapshot))
        .route("/api/clear", post(api::handlers::clear))
        // WebSocket for real-time updates
        .route("/ws", get(websocket::websocket_handler))
        // Middleware (order matters - request_id should be first)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(CorsLayer::permissive()) // Allow CORS for development
        .with_state(api_state);

    // Bind to address from config
    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid server address: {}", e))?;

    info!("🚀 Server running on http://{}", addr);
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Setup graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Handle graceful shutdown signals (Ctrl+C, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}
