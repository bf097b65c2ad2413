//! Chat-completions contract tests.
//!
//! Verify the request format sent to an OpenAI-compatible endpoint, reply
//! parsing, and how HTTP failures map to [`LlmError`] and degrade in the
//! oracle.

use rolecall::NameOracle;
use rolecall::config::LlmConfig;
use rolecall::llm::{ChatClient, ChatMessage, ChatOracle, LlmError, NEUTRAL_CONFIDENCE};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> LlmConfig {
    LlmConfig {
        base_url: server.uri(),
        ..LlmConfig::default()
    }
}

fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    }))
}

fn oracle_for(server: &MockServer) -> ChatOracle {
    let client = ChatClient::new(&config_for(server), "test-key").unwrap();
    ChatOracle::new(client, 3_000, 1_500)
}

#[tokio::test]
async fn request_carries_model_auth_and_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "llama-3.1-8b-instant",
            "stream": false,
            "messages": [{"role": "user", "content": "Hello"}]
        })))
        .respond_with(completion("Hi"))
        .expect(1)
        .mount(&server)
        .await;

    let client = ChatClient::new(&config_for(&server), "test-key").unwrap();
    let reply = client.complete(&[ChatMessage::user("Hello")]).await.unwrap();
    assert_eq!(reply, "Hi");
}

#[tokio::test]
async fn extraction_sends_system_prompt_and_parses_lines() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [{"role": "system"}, {"role": "user"}]
        })))
        .respond_with(completion("Jane Doe\nNONE\n- John Roe\n"))
        .expect(1)
        .mount(&server)
        .await;

    let names = oracle_for(&server)
        .extract_names("Jane Doe and John Roe lead Acme", "Acme", "CEO")
        .await;
    assert_eq!(names, vec!["Jane Doe", "John Roe"]);
}

#[tokio::test]
async fn empty_text_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion("Jane Doe"))
        .expect(0)
        .mount(&server)
        .await;

    assert!(oracle_for(&server).extract_names("  ", "Acme", "CEO").await.is_empty());
}

#[tokio::test]
async fn confirmation_parses_first_number() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion("Confidence: 0.85"))
        .mount(&server)
        .await;

    let score = oracle_for(&server)
        .confirm_designation("Jane Doe", "Acme", "CEO", "Jane Doe is CEO of Acme")
        .await;
    assert_eq!(score, 0.85);
}

#[tokio::test]
async fn confirmation_without_number_is_neutral() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion("I cannot tell."))
        .mount(&server)
        .await;

    let score = oracle_for(&server)
        .confirm_designation("Jane Doe", "Acme", "CEO", "")
        .await;
    assert_eq!(score, NEUTRAL_CONFIDENCE);
}

#[tokio::test]
async fn unauthorized_maps_to_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Invalid API Key", "type": "invalid_request_error"}
        })))
        .mount(&server)
        .await;

    let client = ChatClient::new(&config_for(&server), "bad-key").unwrap();
    let err = client.complete(&[ChatMessage::user("hi")]).await.unwrap_err();
    assert!(matches!(err, LlmError::Auth(_)));
    assert!(err.to_string().contains("Invalid API Key"));
    assert_eq!(err.code(), "AUTH_FAILED");
}

#[tokio::test]
async fn rate_limit_maps_to_request_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let client = ChatClient::new(&config_for(&server), "test-key").unwrap();
    let err = client.complete(&[ChatMessage::user("hi")]).await.unwrap_err();
    assert!(matches!(err, LlmError::Request(ref m) if m.contains("slow down")));
    assert_eq!(err.code(), "REQUEST_FAILED");
}

#[tokio::test]
async fn server_error_degrades_to_empty_and_neutral() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let oracle = oracle_for(&server);
    assert!(oracle.extract_names("Jane Doe", "Acme", "CEO").await.is_empty());
    assert_eq!(
        oracle.confirm_designation("Jane Doe", "Acme", "CEO", "").await,
        NEUTRAL_CONFIDENCE
    );
}

#[tokio::test]
async fn slow_endpoint_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion("Jane Doe").set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let config = LlmConfig {
        timeout_seconds: 1,
        ..config_for(&server)
    };
    let client = ChatClient::new(&config, "test-key").unwrap();
    let err = client.complete(&[ChatMessage::user("hi")]).await.unwrap_err();
    assert_eq!(err.code(), "TIMEOUT_ERROR");
}
