mod common;

use common::{MockTransport, Reply};
use llmapi::{Client, ClientConfig, ErrorKind, LlmError, Role, StreamEvent};
use serde_json::json;

fn client_with(transport: std::sync::Arc<MockTransport>) -> Client {
    Client::with_transport(ClientConfig::new("sk-test").with_model("gpt-5"), transport)
}

#[tokio::test]
async fn test_capital_of_china_whole_response() {
    let transport = MockTransport::answering("Beijing");
    let mut client = client_with(transport.clone());

    client.system("You are a helpful assistant.").unwrap();
    client.user("What is the capital of China?").unwrap();

    let answer = client.request().await.unwrap();

    assert_eq!(answer, "Beijing");
    assert_eq!(client.answer(), Some("Beijing"));
    assert_eq!(client.message_count(), 3);

    let roles: Vec<Role> = client.messages().iter().map(|m| m.role()).collect();
    assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);

    let sent = transport.last_request().unwrap();
    assert_eq!(sent.model, "gpt-5");
    assert!(!sent.stream);
    assert_eq!(sent.messages.len(), 2);
}

#[tokio::test]
async fn test_streaming_forwards_chunks_in_order() {
    let transport = MockTransport::streaming(&["Bei", "jing"]);
    let mut client = client_with(transport.clone());
    client.user("What is the capital of China?").unwrap();

    let mut received = Vec::new();
    let answer = client
        .request_stream(|chunk| received.push(chunk.to_string()))
        .await
        .unwrap();

    assert_eq!(received, vec!["Bei", "jing"]);
    assert_eq!(answer, "Beijing");
    assert_eq!(client.answer(), Some(received.concat().as_str()));
    assert_eq!(client.message_count(), 2);
    assert!(transport.last_request().unwrap().stream);
}

#[tokio::test]
async fn test_missing_choices_is_empty_response() {
    let transport = MockTransport::new(Reply::Document(json!({"id": "x", "object": "chat.completion"})));
    let mut client = client_with(transport);
    client.user("Hello").unwrap();

    let err = client.request().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::EmptyResponse);
    assert_eq!(client.message_count(), 1);
    assert_eq!(client.answer(), None);
}

#[tokio::test]
async fn test_empty_content_is_empty_response() {
    let mut client = client_with(MockTransport::answering(""));
    client.user("Hello").unwrap();

    let err = client.request().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyResponse);
    assert_eq!(client.message_count(), 1);
}

#[tokio::test]
async fn test_network_failure_leaves_transcript_unchanged() {
    let mut client = client_with(MockTransport::failing(LlmError::network("connection refused")));
    client.user("one").unwrap();
    client.assistant("first").unwrap();
    client.user("two").unwrap();

    let before_count = client.message_count();
    let before_answer = client.answer().map(str::to_string);

    let err = client.request().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(client.message_count(), before_count);
    assert_eq!(client.answer().map(str::to_string), before_answer);

    let mut calls = 0;
    let err = client.request_stream(|_| calls += 1).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(calls, 0);
    assert_eq!(client.message_count(), before_count);
    assert_eq!(client.answer(), Some("first"));
}

#[tokio::test]
async fn test_no_model_is_invalid_state() {
    let transport = MockTransport::answering("unused");
    let mut client = Client::with_transport(ClientConfig::new("sk-test"), transport.clone());

    let err = client.request().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    client.user("Hello").unwrap();
    let err = client.request().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    let err = client.request_stream(|_| {}).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_empty_transcript_is_invalid_state() {
    let transport = MockTransport::answering("unused");
    let mut client = client_with(transport.clone());

    let err = client.request().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_stream_dropped_mid_way_commits_nothing() {
    let transport = MockTransport::new(Reply::Events(vec![
        Ok(StreamEvent::Delta {
            content: "Bei".to_string(),
        }),
        Err(LlmError::network("Stream error: connection reset")),
    ]));
    let mut client = client_with(transport);
    client.user("What is the capital of China?").unwrap();

    let mut received = Vec::new();
    let err = client
        .request_stream(|chunk| received.push(chunk.to_string()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(received, vec!["Bei"]);
    assert_eq!(client.message_count(), 1);
    assert_eq!(client.answer(), None);
}

#[tokio::test]
async fn test_stream_without_completion_marker_is_network_error() {
    let transport = MockTransport::new(Reply::Events(vec![Ok(StreamEvent::Delta {
        content: "Bei".to_string(),
    })]));
    let mut client = client_with(transport);
    client.user("Hi").unwrap();

    let err = client.request_stream(|_| {}).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(client.message_count(), 1);
}

#[tokio::test]
async fn test_stream_with_no_content_is_empty_response() {
    let mut client = client_with(MockTransport::streaming(&[]));
    client.user("Hi").unwrap();

    let mut calls = 0;
    let err = client.request_stream(|_| calls += 1).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyResponse);
    assert_eq!(calls, 0);
    assert_eq!(client.message_count(), 1);
}

#[tokio::test]
async fn test_turns_accumulate_and_clear_resets() {
    let transport = MockTransport::answering("Beijing");
    let mut client = client_with(transport.clone());

    client.user("q1").unwrap();
    client.request().await.unwrap();
    client.user("q2").unwrap();
    client.request().await.unwrap();

    assert_eq!(client.message_count(), 4);
    // the second request carries the first answer
    assert_eq!(transport.last_request().unwrap().messages.len(), 3);

    client.clear();
    assert_eq!(client.message_count(), 0);
    assert_eq!(client.answer(), None);
}

#[tokio::test]
async fn test_model_change_applies_to_next_request() {
    let transport = MockTransport::answering("ok");
    let mut client = client_with(transport.clone());
    client.user("Hi").unwrap();

    client.set_model("gpt-4o").unwrap();
    client.request().await.unwrap();

    assert_eq!(transport.last_request().unwrap().model, "gpt-4o");
}

#[tokio::test]
async fn test_unreachable_endpoint_is_network_error() {
    let config = ClientConfig::new("sk-test")
        .with_base_url("http://127.0.0.1:9/v1")
        .with_model("gpt-5")
        .with_timeout(std::time::Duration::from_secs(5));
    let mut client = Client::from_config(config).unwrap();
    client.user("Hi").unwrap();

    let err = client.request().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(client.message_count(), 1);
}

#[tokio::test]
async fn test_rejected_answer_is_not_committed() {
    let transport = MockTransport::answering("Beijing");
    let mut client = client_with(transport.clone());
    client.user("What is the capital of China?").unwrap();

    let err = client
        .request_with(|_| Err::<(), _>(LlmError::parse("unusable answer")))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Parse);
    assert_eq!(client.message_count(), 1);
    assert_eq!(client.answer(), None);

    let length = client.request_with(|answer| Ok(answer.len())).await.unwrap();
    assert_eq!(length, "Beijing".len());
    assert_eq!(client.answer(), Some("Beijing"));
}
