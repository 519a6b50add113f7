#![allow(dead_code)]

use serde_json::json;
use wastewise::Config;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const GENERATE_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";
pub const UPLOAD_PATH: &str = "/upload/v1beta/files";
pub const COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Nothing listens on port 1, so requests there fail at the transport layer.
pub const DEAD_BASE: &str = "http://127.0.0.1:1";

pub fn test_config(gemini_base: &str, openai_base: &str, geolocation_url: &str) -> Config {
    Config {
        gemini_api_key: "test-gemini-key".to_string(),
        gemini_api_base: gemini_base.to_string(),
        gemini_model: "gemini-1.5-flash".to_string(),
        openai_api_key: "test-openai-key".to_string(),
        openai_api_base: openai_base.to_string(),
        openai_model: "gpt-4".to_string(),
        centers_max_tokens: 500,
        geolocation_url: geolocation_url.to_string(),
        templates_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/templates").to_string(),
        static_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/static").to_string(),
    }
}

pub fn candidate_body(text: &str) -> serde_json::Value {
    json!({
        "candidates": [
            {"content": {"role": "model", "parts": [{"text": text}]}}
        ]
    })
}

/// Mounts a generateContent mock answering with `text`, expected `times` times.
pub async fn mount_generate(server: &MockServer, text: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body(text)))
        .expect(times)
        .mount(server)
        .await;
}

pub async fn mount_upload(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path(UPLOAD_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "file": {
                "name": "files/waste-photo",
                "uri": format!("{}/v1beta/files/waste-photo", server.uri()),
                "mimeType": "image/png"
            }
        })))
        .expect(times)
        .mount(server)
        .await;
}

pub async fn mount_completion(server: &MockServer, content: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}
            ]
        })))
        .expect(times)
        .mount(server)
        .await;
}
