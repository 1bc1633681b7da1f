//! End-to-end chat flow against a mock backend
//!
//! Runs the `ChatController` with the real `QaClient` so that connection
//! probing, history merging, and submission failures are exercised over
//! HTTP.

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use querygpt::api::QaClient;
use querygpt::chat::connection;
use querygpt::chat::{
    ChatContext, ChatController, ConnectionStatus, HistoryLoad, MergeMode, Role, SubmitOutcome,
    SubmitRejection, ViewState, ERROR_FALLBACK_TEXT,
};

mod common;

fn client_for(server: &MockServer) -> QaClient {
    QaClient::new(&common::config_for(&server.uri()).api).expect("client")
}

async fn mount_health(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

async fn connected(client: &QaClient) -> ChatContext {
    let mut ctx = ChatContext::new(Some("tok".to_string()));
    connection::probe(client, &mut ctx.connection).await;
    assert_eq!(ctx.connection, ConnectionStatus::Connected);
    ctx
}

#[tokio::test]
async fn test_probe_reports_disconnected_on_error_status() {
    let server = MockServer::start().await;
    mount_health(&server, 500).await;

    let client = client_for(&server);
    let mut status = ConnectionStatus::Connected;
    assert_eq!(
        connection::probe(&client, &mut status).await,
        ConnectionStatus::Disconnected
    );
}

#[tokio::test]
async fn test_history_then_question() {
    let server = MockServer::start().await;
    mount_health(&server, 200).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/qa/history"))
        .and(query_param("page", "1"))
        .and(query_param("size", "50"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sessions": [
                common::session_json(2, "2024-01-15T11:00:00", true, 100),
                common::session_json(1, "2024-01-15T10:00:00", false, 300),
            ],
            "total": 2,
            "page": 1,
            "size": 50,
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/qa/ask"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "Fresh answer",
            "response_time_ms": 250,
            "is_successful": true,
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut ctx = connected(&client).await;
    let mut controller = ChatController::new("openai");

    let load = controller
        .load_history(&client, &mut ctx, 1, 50, MergeMode::Replace)
        .await;
    assert_eq!(load, HistoryLoad::Loaded { sessions: 2, total: 2 });
    assert_eq!(controller.view(), ViewState::Conversation);
    assert_eq!(controller.stats().success_rate, 50);
    assert_eq!(controller.stats().avg_response_time_ms, 200);

    let outcome = controller
        .submit_question(&client, &mut ctx, "Another question")
        .await
        .expect("accepted");
    assert_eq!(outcome, SubmitOutcome::Answered { is_successful: true });

    let ids: Vec<&str> = controller.messages().iter().map(|m| m.id.as_str()).collect();
    assert_eq!(&ids[..4], &["user-1", "assistant-1", "user-2", "assistant-2"]);
    assert_eq!(controller.messages().len(), 6);

    let last = controller.messages().last().unwrap();
    assert_eq!(last.role, Role::Assistant);
    assert_eq!(last.content, "Fresh answer");
    assert_eq!(last.response_time_ms, Some(250));
    assert_eq!(controller.question_count(), 3);
}

#[tokio::test]
async fn test_history_forbidden_is_silent() {
    let server = MockServer::start().await;
    mount_health(&server, 200).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/qa/history"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut ctx = connected(&client).await;
    let mut controller = ChatController::new("openai");

    let load = controller
        .load_history(&client, &mut ctx, 1, 50, MergeMode::Replace)
        .await;
    assert_eq!(load, HistoryLoad::Forbidden);
    assert!(controller.messages().is_empty());
    assert!(controller.shows_welcome());
    assert_eq!(ctx.connection, ConnectionStatus::Connected);
}

#[tokio::test]
async fn test_failed_ask_appends_fallback_and_reprobes() {
    let server = MockServer::start().await;
    // First probe succeeds, the re-probe after the failure does not.
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/qa/ask"))
        .respond_with(ResponseTemplate::new(500).set_body_string("LLM unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut ctx = connected(&client).await;
    let mut controller = ChatController::new("openai");

    let outcome = controller
        .submit_question(&client, &mut ctx, "hello")
        .await
        .expect("accepted");
    assert_eq!(outcome, SubmitOutcome::Failed);
    assert_eq!(controller.messages().len(), 2);
    assert_eq!(controller.messages()[1].content, ERROR_FALLBACK_TEXT);
    assert_eq!(controller.messages()[1].is_successful, Some(false));
    assert_eq!(ctx.connection, ConnectionStatus::Disconnected);

    // Offline now, so the next submission is rejected without a request.
    let rejection = controller
        .submit_question(&client, &mut ctx, "again")
        .await
        .unwrap_err();
    assert_eq!(
        rejection,
        SubmitRejection::NotConnected(ConnectionStatus::Disconnected)
    );
    assert_eq!(controller.messages().len(), 2);
}

#[tokio::test]
async fn test_signed_out_never_calls_backend() {
    let server = MockServer::start().await;
    mount_health(&server, 200).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/qa/ask"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/qa/history"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut ctx = ChatContext::new(None);
    connection::probe(&client, &mut ctx.connection).await;
    let mut controller = ChatController::new("openai");

    assert_eq!(
        controller
            .load_history(&client, &mut ctx, 1, 50, MergeMode::Replace)
            .await,
        HistoryLoad::Skipped
    );
    assert_eq!(
        controller
            .submit_question(&client, &mut ctx, "hello")
            .await
            .unwrap_err(),
        SubmitRejection::MissingToken
    );
}

#[tokio::test]
async fn test_history_with_null_latency_still_loads() {
    let server = MockServer::start().await;
    mount_health(&server, 200).await;

    let mut stored_without_latency = common::session_json(1, "2024-01-15T10:00:00", false, 0);
    stored_without_latency["response_time_ms"] = serde_json::Value::Null;

    Mock::given(method("GET"))
        .and(path("/api/v1/qa/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sessions": [
                common::session_json(2, "2024-01-15T11:00:00", true, 400),
                stored_without_latency,
            ],
            "total": 2,
            "page": 1,
            "size": 50,
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut ctx = connected(&client).await;
    let mut controller = ChatController::new("openai");

    let load = controller
        .load_history(&client, &mut ctx, 1, 50, MergeMode::Replace)
        .await;
    assert_eq!(load, HistoryLoad::Loaded { sessions: 2, total: 2 });
    assert_eq!(controller.messages().len(), 4);
    assert_eq!(controller.messages()[1].response_time_ms, Some(0));
    assert_eq!(controller.stats().avg_response_time_ms, 200);
    assert_eq!(controller.stats().success_rate, 50);
}

#[tokio::test]
async fn test_reconnect_allows_history_reload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_health(&server, 200).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/qa/history"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sessions": [common::session_json(3, "2024-01-15T10:00:00", true, 80)],
            "total": 1,
            "page": 1,
            "size": 50,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut ctx = ChatContext::new(Some("tok".to_string()));
    connection::probe(&client, &mut ctx.connection).await;
    assert_eq!(ctx.connection, ConnectionStatus::Disconnected);

    let before = ctx.connection;
    let after = connection::probe(&client, &mut ctx.connection).await;
    assert!(after.recovered_from(before));

    let mut controller = ChatController::new("openai");
    let load = controller
        .load_history(&client, &mut ctx, 1, 50, MergeMode::Replace)
        .await;
    assert_eq!(load, HistoryLoad::Loaded { sessions: 1, total: 1 });
    assert_eq!(controller.messages().len(), 2);
}
