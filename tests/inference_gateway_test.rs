mod common;

use common::*;
use serde_json::json;
use wastewise::error::{FailureKind, UNEXPECTED_FORMAT_MESSAGE, UNSUPPORTED_FILE_MESSAGE};
use wastewise::gemini::GeminiClient;
use wastewise::inference::{InferenceGateway, InferenceRequest};
use wastewise::prompts::TEXT_INSTRUCTION;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PREFIX: &str = "An error occurred during the upload or generation process:";

fn gateway_for(base: &str) -> InferenceGateway {
    InferenceGateway::new(GeminiClient::new(base, "test-gemini-key", "gemini-1.5-flash"))
}

#[test_log::test(tokio::test)]
async fn test_gif_is_rejected_without_remote_call() {
    let server = MockServer::start().await;
    mount_upload(&server, 0).await;
    mount_generate(&server, "never", 0).await;

    let reply = gateway_for(&server.uri())
        .classify_image(vec![0x47, 0x49, 0x46], "image/gif")
        .await;

    assert_eq!(reply, UNSUPPORTED_FILE_MESSAGE);
    // expect(0) is verified when `server` drops
}

#[tokio::test]
async fn test_unsupported_kind_is_structured() {
    let err = gateway_for(DEAD_BASE)
        .respond(InferenceRequest::Image { bytes: vec![1], mime_type: "image/webp".into() })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::UnsupportedInput);
}

#[tokio::test]
async fn test_image_is_uploaded_then_classified() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(UPLOAD_PATH))
        .and(header("x-goog-api-key", "test-gemini-key"))
        .and(header("X-Goog-Upload-Protocol", "raw"))
        .and(header("Content-Type", "image/png"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "file": {"name": "files/abc", "uri": "https://files.test/abc", "mimeType": "image/png"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_partial_json(json!({
            "contents": [{"parts": [
                {"file_data": {"mime_type": "image/png", "file_uri": "https://files.test/abc"}},
                {"text": "\n\n"}
            ]}]
        })))
        .and(body_string_contains("prices in MYR"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body(
            "  This PET bottle is recyclable. Approx. RM 1.20/kg.  ",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let reply = gateway_for(&server.uri())
        .classify_image(vec![0x89, 0x50, 0x4e, 0x47], "image/png")
        .await;

    assert_eq!(reply, "This PET bottle is recyclable. Approx. RM 1.20/kg.");
}

#[tokio::test]
async fn test_text_query_carries_text_instruction() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_partial_json(json!({
            "contents": [{"role": "user", "parts": [
                {"text": "How do I recycle glass?"},
                {"text": "\n\n"},
                {"text": TEXT_INSTRUCTION}
            ]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("Rinse it first.")))
        .expect(1)
        .mount(&server)
        .await;

    let reply = gateway_for(&server.uri()).answer_text("How do I recycle glass?").await;
    assert_eq!(reply, "Rinse it first.");
}

#[tokio::test]
async fn test_zero_candidates_gives_fallback_for_both_paths() {
    let server = MockServer::start().await;
    mount_upload(&server, 1).await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .expect(2)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server.uri());
    assert_eq!(gateway.answer_text("What can I recycle?").await, UNEXPECTED_FORMAT_MESSAGE);
    assert_eq!(
        gateway.classify_image(vec![0xff, 0xd8], "image/jpeg").await,
        UNEXPECTED_FORMAT_MESSAGE
    );
}

#[tokio::test]
async fn test_transport_error_is_swallowed_into_text() {
    let gateway = gateway_for(DEAD_BASE);

    let text_reply = gateway.answer_text("What can I recycle?").await;
    assert!(text_reply.starts_with(PREFIX), "got: {}", text_reply);
    assert!(text_reply.contains("error sending request"), "got: {}", text_reply);
    assert!(!text_reply.contains("test-gemini-key"));

    let image_reply = gateway.classify_image(vec![0xff, 0xd8], "image/jpeg").await;
    assert!(image_reply.starts_with(PREFIX), "got: {}", image_reply);

    let err = gateway
        .respond(InferenceRequest::Text { text: "hi".into() })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::Transport);
}

#[tokio::test]
async fn test_provider_error_includes_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server.uri());
    let reply = gateway.answer_text("What can I recycle?").await;
    assert_eq!(
        reply,
        format!("{} provider returned 403: API key not valid", PREFIX)
    );

    let err = gateway
        .respond(InferenceRequest::Text { text: "again".into() })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::Provider);
}
