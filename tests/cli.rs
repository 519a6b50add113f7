use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("wastewise").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: wastewise <COMMAND>"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("start"))
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("centers"))
        .stdout(predicate::str::contains("--version"));
}

#[test]
fn test_cli_start_help() {
    let mut cmd = Command::cargo_bin("wastewise").unwrap();
    cmd.arg("start")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: wastewise start"))
        .stdout(predicate::str::contains("--port <PORT>"))
        .stdout(predicate::str::contains("9900"));
}

#[test]
fn test_cli_centers_help() {
    let mut cmd = Command::cargo_bin("wastewise").unwrap();
    cmd.arg("centers")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--city <CITY>"))
        .stdout(predicate::str::contains("--state <STATE>"))
        .stdout(predicate::str::contains("--postcode <POSTCODE>"));
}

#[test]
fn test_cli_no_command() {
    let mut cmd = Command::cargo_bin("wastewise").unwrap();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage: wastewise <COMMAND>"));
}

#[test]
fn test_missing_api_keys_is_fatal() {
    let mut cmd = Command::cargo_bin("wastewise").unwrap();
    cmd.env_clear()
        .current_dir(std::env::temp_dir())
        .arg("start")
        .assert()
        .failure()
        .stderr(predicate::str::contains("GEMINI_API_KEY"));
}

#[test]
fn test_missing_openai_key_is_fatal() {
    let mut cmd = Command::cargo_bin("wastewise").unwrap();
    cmd.env_clear()
        .current_dir(std::env::temp_dir())
        .env("GEMINI_API_KEY", "g-key")
        .args(["centers", "--city", "Klang", "--state", "Selangor", "--postcode", "42000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}

#[test]
fn test_centers_with_blank_field_warns_offline() {
    // No provider is reachable; the missing field must stop the lookup first.
    let mut cmd = Command::cargo_bin("wastewise").unwrap();
    cmd.env_clear()
        .current_dir(std::env::temp_dir())
        .env("GEMINI_API_KEY", "g-key")
        .env("OPENAI_API_KEY", "o-key")
        .env("OPENAI_API_BASE", "http://127.0.0.1:1")
        .args(["centers", "--city", "", "--state", "Selangor", "--postcode", "43000"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Please fill in all fields to find nearby recycling centers.",
        ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_centers_prints_preamble_before_listing() {
    let openai = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "- **Kajang Eco Centre**"}}]
        })))
        .expect(1)
        .mount(&openai)
        .await;
    let base = openai.uri();

    let output = tokio::task::spawn_blocking(move || {
        Command::cargo_bin("wastewise")
            .unwrap()
            .env_clear()
            .current_dir(std::env::temp_dir())
            .env("GEMINI_API_KEY", "g-key")
            .env("OPENAI_API_KEY", "o-key")
            .env("OPENAI_API_BASE", base)
            .args(["centers", "--city", "Kajang", "--state", "Selangor", "--postcode", "43000"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let preamble = stdout
        .find("Based on your location in Kajang, Selangor, 43000, here are some local recycling centers you might consider:")
        .expect("preamble printed");
    let listing = stdout.find("- **Kajang Eco Centre**").expect("listing printed");
    assert!(preamble < listing);
}
