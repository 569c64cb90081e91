use pwstate::config::config::{Config, HeaderStyle, UpdateRoute};
use pwstate::core::client::PasswordstateClient;
use pwstate::core::diff::FieldDiff;
use pwstate::core::error::ReconcileError;
use pwstate::core::ports::CredentialApi;
use pwstate::core::record::{CredentialRecord, DesiredState};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(url: &str, header_style: HeaderStyle, update_route: UpdateRoute) -> Config {
    Config {
        url: url.to_string(),
        api_key: SecretString::from("s3cr3t-key"),
        header_style,
        update_route,
        timeout: Duration::from_secs(5),
    }
}

fn client(server: &MockServer) -> PasswordstateClient {
    PasswordstateClient::from_config(&config(
        &server.uri(),
        HeaderStyle::Snake,
        UpdateRoute::Body,
    ))
    .expect("client")
}

fn password_diff(current_pw: &str, desired_pw: &str) -> FieldDiff {
    let current = CredentialRecord {
        id: 123,
        username: Some("alice".into()),
        password: Some(SecretString::from(current_pw)),
        title: String::new(),
        description: String::new(),
        expiry: String::new(),
    };
    let desired = DesiredState::new(123).with_password(SecretString::from(desired_pw));
    FieldDiff::compute(&current, &desired)
}

#[tokio::test]
async fn fetch_unwraps_single_record_and_sends_api_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/passwords/123"))
        .and(header("api_key", "s3cr3t-key"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "PasswordID": 123,
            "Title": "My User",
            "UserName": "alice",
            "Password": "old",
            "Description": "Used for example services",
            "ExpiryDate": "15/10/1999"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let rec = client(&server).fetch(123).await.unwrap().expect("record");
    assert_eq!(rec.id, 123);
    assert_eq!(rec.username.as_deref(), Some("alice"));
    assert_eq!(rec.password.unwrap().expose_secret(), "old");
    assert_eq!(rec.description, "Used for example services");
    assert_eq!(rec.expiry, "15/10/1999");
}

#[tokio::test]
async fn fetch_uses_pascal_header_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/passwords/5"))
        .and(header("APIKey", "s3cr3t-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"UserName": "u"}])))
        .expect(1)
        .mount(&server)
        .await;

    let c = PasswordstateClient::from_config(&config(
        &server.uri(),
        HeaderStyle::Pascal,
        UpdateRoute::Body,
    ))
    .unwrap();
    let rec = c.fetch(5).await.unwrap().expect("record");
    assert_eq!(rec.id, 5);
}

#[tokio::test]
async fn fetch_empty_collection_is_no_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/passwords/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    assert!(client(&server).fetch(9).await.unwrap().is_none());
}

#[tokio::test]
async fn fetch_empty_body_is_no_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/passwords/9"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    assert!(client(&server).fetch(9).await.unwrap().is_none());
}

#[tokio::test]
async fn non_success_status_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/passwords/1"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Invalid API key"))
        .mount(&server)
        .await;

    let err = client(&server).fetch(1).await.unwrap_err();
    match &err {
        ReconcileError::Api { status, message } => {
            assert_eq!(*status, Some(403));
            assert!(message.contains("Invalid API key"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert!(!err.to_string().contains("s3cr3t-key"));
}

#[tokio::test]
async fn invalid_json_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let err = client(&server).fetch(1).await.unwrap_err();
    assert!(matches!(err, ReconcileError::Api { status: None, .. }));
}

#[tokio::test]
async fn connection_failure_is_api_error() {
    let c = PasswordstateClient::from_config(&config(
        "http://127.0.0.1:1",
        HeaderStyle::Snake,
        UpdateRoute::Body,
    ))
    .unwrap();
    let err = c.fetch(1).await.unwrap_err();
    assert!(matches!(err, ReconcileError::Api { status: None, .. }));
    assert!(err.to_string().starts_with("API request failed"));
}

#[tokio::test]
async fn update_body_route_puts_id_in_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/passwords/"))
        .and(header("api_key", "s3cr3t-key"))
        .and(body_json(json!({"PasswordID": 123, "Password": "new"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"PasswordID": 123}])))
        .expect(1)
        .mount(&server)
        .await;

    let ack = client(&server)
        .update(123, &password_diff("old", "new"))
        .await
        .unwrap();
    assert_eq!(ack, json!([{"PasswordID": 123}]));
}

#[tokio::test]
async fn update_path_route_keys_url_by_id() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/passwords/123"))
        .and(body_json(json!({"PasswordID": 123, "Password": "new"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let c = PasswordstateClient::from_config(&config(
        &server.uri(),
        HeaderStyle::Snake,
        UpdateRoute::Path,
    ))
    .unwrap();
    let ack = c.update(123, &password_diff("old", "new")).await.unwrap();
    assert_eq!(ack, json!({"ok": true}));
}

#[tokio::test]
async fn update_failure_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client(&server)
        .update(123, &password_diff("old", "new"))
        .await
        .unwrap_err();
    assert!(matches!(err, ReconcileError::Api { status: Some(500), .. }));
}

#[test]
fn api_key_with_control_characters_is_rejected() {
    let mut cfg = config("https://pws.example.com", HeaderStyle::Snake, UpdateRoute::Body);
    cfg.api_key = SecretString::from("bad\nkey");
    let err = PasswordstateClient::from_config(&cfg).err().expect("error");
    assert!(matches!(err, ReconcileError::Configuration(_)));
    assert!(!err.to_string().contains("bad\nkey"));
}
