//! Integration tests for the external-adapter processing path
//!
//! The external backend's HTTP surface is mocked with mockito; push
//! channel delivery is simulated by appending the response message to the
//! store directly, exactly as the channel task would.

use agent_collab_backend::adapter::AutogenClient;
use agent_collab_backend::error::AppError;
use agent_collab_backend::service::CollabService;
use agent_collab_backend::simulation::NoDelay;
use agent_collab_backend::state::{
    shared_store, Message, MessageType, RequestStatus, USER_RECIPIENT,
};
use std::sync::Arc;

const READY_STATUS: &str = r#"{"autogen_installed": true, "openai_api_key_configured": true}"#;

async fn mock_backend(server: &mut mockito::ServerGuard, status_body: &str) {
    server
        .mock("GET", "/status")
        .with_status(200)
        .with_body(status_body)
        .create_async()
        .await;
    server
        .mock("POST", "/api/request")
        .with_status(200)
        .with_body(r#"{"conversation_id": "conv-1", "status": "processing"}"#)
        .create_async()
        .await;
}

#[tokio::test]
async fn test_adapter_request_completes_on_pushed_response() {
    let mut server = mockito::Server::new_async().await;
    mock_backend(&mut server, READY_STATUS).await;

    let store = shared_store();
    let client = Arc::new(AutogenClient::new(reqwest::Client::new(), server.url()));
    let service = Arc::new(CollabService::with_adapter(
        store.clone(),
        Arc::new(NoDelay),
        client,
    ));

    let submit = {
        let service = service.clone();
        tokio::spawn(async move { service.submit_user_request("external request").await })
    };

    // Wait until the conversation is registered with the external backend;
    // from then on the service is listening for pushed updates.
    loop {
        let created = store
            .read()
            .await
            .traces()
            .iter()
            .any(|t| t.action == "conversation_created");
        if created {
            break;
        }
        tokio::task::yield_now().await;
    }

    // Simulate the push channel delivering the final response
    store.write().await.add_message(Message::new(
        "executor-1",
        USER_RECIPIENT,
        "answer from the external framework",
        MessageType::Response,
    ));

    let request = submit.await.unwrap().unwrap();
    assert_eq!(request.status, RequestStatus::Completed);
    assert_eq!(
        request.result.as_deref(),
        Some("answer from the external framework")
    );
    assert!(!store.read().await.is_processing());
}

#[tokio::test]
async fn test_adapter_not_ready_fails_request() {
    let mut server = mockito::Server::new_async().await;
    mock_backend(
        &mut server,
        r#"{"autogen_installed": false, "openai_api_key_configured": true}"#,
    )
    .await;

    let store = shared_store();
    let client = Arc::new(AutogenClient::new(reqwest::Client::new(), server.url()));
    let service = CollabService::with_adapter(store.clone(), Arc::new(NoDelay), client);

    let request = service.submit_user_request("will not run").await.unwrap();
    assert_eq!(request.status, RequestStatus::Failed);
    assert!(request.result.unwrap().contains("not ready"));

    let store = store.read().await;
    assert!(!store.is_processing());
    assert!(store.traces().iter().any(|t| t.action == "error"));
}

#[tokio::test]
async fn test_adapter_unreachable_backend_fails_request() {
    // Nothing is listening on this port
    let store = shared_store();
    let client = Arc::new(AutogenClient::new(
        reqwest::Client::new(),
        "http://127.0.0.1:9",
    ));
    let service = CollabService::with_adapter(store.clone(), Arc::new(NoDelay), client);

    let request = service.submit_user_request("unreachable").await.unwrap();
    assert_eq!(request.status, RequestStatus::Failed);
    assert!(!store.read().await.is_processing());
}

#[tokio::test]
async fn test_connect_probe_does_not_touch_state() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/status")
        .with_status(503)
        .create_async()
        .await;

    let client = AutogenClient::new(reqwest::Client::new(), server.url());
    assert!(matches!(
        client.connect().await,
        Err(AppError::BackendUnavailable(_))
    ));
    assert!(!client.is_connected());
}
