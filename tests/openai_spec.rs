use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use axum::{extract::State, http::HeaderMap, http::StatusCode, routing::post, Json, Router};
use idea_shaper::llm::{
    GenerationError, Generator, OpenAiClient, OptionsRequest, Resilient, RetryPolicy,
};
use serde_json::{json, Value};

/// Canned chat-completions endpoint. Fails with 503 for the first
/// `failures` calls, then answers with `content`.
#[derive(Clone)]
struct MockProvider {
    content: String,
    failures: usize,
    calls: Arc<AtomicUsize>,
}

async fn chat_completions(
    State(provider): State<MockProvider>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let call = provider.calls.fetch_add(1, Ordering::SeqCst);

    if headers.get("authorization").and_then(|h| h.to_str().ok()) != Some("Bearer test-key") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": { "message": "Incorrect API key provided" } })),
        );
    }
    if body["messages"][0]["role"] != "system" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": { "message": "missing system message" } })),
        );
    }
    if call < provider.failures {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": { "message": "overloaded" } })),
        );
    }

    (
        StatusCode::OK,
        Json(json!({ "choices": [{ "message": { "content": provider.content } }] })),
    )
}

async fn spawn_provider(content: &str, failures: usize) -> (String, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let provider = MockProvider {
        content: content.to_string(),
        failures,
        calls: calls.clone(),
    };
    let app = Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .with_state(provider);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock provider");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Mock provider failed");
    });

    (format!("http://{}/v1", addr), calls)
}

fn client(base_url: &str, key: &str) -> OpenAiClient {
    OpenAiClient::new(Some(key.to_string())).with_base_url(base_url)
}

fn fast_policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        timeout: Duration::from_secs(5),
        max_retries,
        base_backoff: Duration::from_millis(1),
    }
}

#[tokio::test]
async fn parses_an_agenda_inside_a_code_fence() {
    let content = "Here you go:\n```json\n{\"dimensions\": [\
        {\"id\": \"platform\", \"name\": \"Platform\", \"description\": \"Where it runs\"},\
        {\"id\": \"audience\", \"name\": \"Audience\"}]}\n```";
    let (base_url, _) = spawn_provider(content, 0).await;

    let agenda = client(&base_url, "test-key")
        .generate_agenda("A recipe sharing app")
        .await
        .expect("agenda generation failed");

    assert_eq!(agenda.len(), 2);
    assert_eq!(agenda[0].id, "platform");
    assert_eq!(agenda[1].description, "");
}

#[tokio::test]
async fn assigns_ids_to_options_without_them() {
    let content = r#"[{"text": "Web"}, {"id": "native", "text": "Native apps"}]"#;
    let (base_url, _) = spawn_provider(content, 0).await;

    let request = OptionsRequest {
        initial_idea: "A recipe sharing app".to_string(),
        dimension_name: "Platform".to_string(),
        ..Default::default()
    };
    let options = client(&base_url, "test-key")
        .generate_options(&request)
        .await
        .expect("option generation failed");

    assert_eq!(options.len(), 2);
    assert_eq!(options[0].id, "option-1");
    assert_eq!(options[1].id, "native");
    assert!(options.iter().all(|o| !o.is_edited));
}

#[tokio::test]
async fn surfaces_the_provider_error_message() {
    let (base_url, _) = spawn_provider("[]", 0).await;

    let error = client(&base_url, "wrong-key")
        .generate_agenda("idea")
        .await
        .unwrap_err();

    match error {
        GenerationError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Incorrect API key provided");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn rejects_prose_instead_of_json() {
    let (base_url, _) = spawn_provider("I cannot help with that.", 0).await;

    let error = client(&base_url, "test-key")
        .generate_agenda("idea")
        .await
        .unwrap_err();

    assert!(matches!(error, GenerationError::Parse(_)));
    assert!(!error.is_retryable());
}

#[tokio::test]
async fn retries_transient_provider_failures() {
    let content = r#"[{"name": "Platform"}, {"name": "Audience"}, {"name": "Pricing"}]"#;
    let (base_url, calls) = spawn_provider(content, 2).await;

    let resilient = Resilient::new(Arc::new(client(&base_url, "test-key")), fast_policy(2));
    let agenda = resilient
        .generate_agenda("idea")
        .await
        .expect("retries should recover");

    assert_eq!(agenda.len(), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn does_not_retry_client_errors() {
    let (base_url, calls) = spawn_provider("[]", 0).await;

    let resilient = Resilient::new(Arc::new(client(&base_url, "wrong-key")), fast_policy(3));
    let result = resilient.generate_agenda("idea").await;

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
