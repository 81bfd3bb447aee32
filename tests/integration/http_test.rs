//! HTTP-level tests for the token exchange and the model client.
//!
//! Both run against a local stub server, so no network access is needed.

use super::support::{closed_port_url, fixture_path, StubReply, StubServer};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use pretty_assertions::assert_eq;
use std::time::Duration;
use table_insight::auth::{
    AssertionClaims, BearerToken, ServiceAccountTokenProvider, ServiceCredential, TokenProvider,
    CLOUD_PLATFORM_SCOPE,
};
use table_insight::config::VertexConfig;
use table_insight::error::InsightError;
use table_insight::llm::{ModelClient, ModelResponse, ShapeStage, VertexClient, VertexEndpoint};

fn client_for(server_url: &str, timeout_secs: u64) -> VertexClient {
    let config = VertexConfig {
        api_base: Some(server_url.to_string()),
        timeout_secs,
        ..VertexConfig::default()
    };
    VertexClient::new(VertexEndpoint::from_config(&config, "insight-test")).unwrap()
}

fn token() -> BearerToken {
    BearerToken::new("ya29.test-token", Duration::from_secs(3600))
}

fn fixture_credential(token_uri: String) -> ServiceCredential {
    let mut credential = ServiceCredential::load(&fixture_path("service-account.json")).unwrap();
    credential.token_uri = token_uri;
    credential
}

#[tokio::test]
async fn test_generate_returns_first_part_text() {
    let server = StubServer::start(StubReply::json(
        200,
        r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Revenue grew 12%."}]}}]}"#,
    ))
    .await;
    let client = client_for(&server.base_url, 5);

    let response = client.generate(&token(), "Analyze this").await;
    assert_eq!(response, ModelResponse::Success("Revenue grew 12%.".to_string()));

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(
        request.request_line(),
        "POST /v1beta1/projects/insight-test/locations/asia-northeast1/publishers/google/models/gemini-2.0-flash:generateContent HTTP/1.1"
    );
    assert_eq!(
        request.header("authorization").as_deref(),
        Some("Bearer ya29.test-token")
    );

    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({"contents": [{"role": "user", "parts": [{"text": "Analyze this"}]}]})
    );
}

#[tokio::test]
async fn test_generate_rate_limited() {
    let body = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
    let server = StubServer::start(StubReply::json(429, body)).await;
    let client = client_for(&server.base_url, 5);

    let response = client.generate(&token(), "p").await;
    assert_eq!(
        response,
        ModelResponse::Status {
            code: 429,
            body: body.to_string()
        }
    );
    assert!(response.to_string().starts_with("Error 429: "));
}

#[tokio::test]
async fn test_generate_empty_candidates() {
    let server = StubServer::start(StubReply::json(200, r#"{"candidates": []}"#)).await;
    let client = client_for(&server.base_url, 5);

    let response = client.generate(&token(), "p").await;
    assert!(matches!(response, ModelResponse::EmptyCandidates { .. }));
}

#[tokio::test]
async fn test_generate_missing_candidates() {
    let server = StubServer::start(StubReply::json(
        200,
        r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#,
    ))
    .await;
    let client = client_for(&server.base_url, 5);

    match client.generate(&token(), "p").await {
        ModelResponse::Shape { stage, .. } => assert_eq!(stage, ShapeStage::Candidates),
        other => panic!("expected a shape error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_generate_timeout_is_not_a_transport_error() {
    let server = StubServer::start(StubReply::Hang).await;
    let client = client_for(&server.base_url, 1);

    let response = client.generate(&token(), "p").await;
    assert_eq!(response, ModelResponse::Timeout { secs: 1 });
    assert_eq!(response.to_string(), "Error: API timeout (1s elapsed)");
}

#[tokio::test]
async fn test_generate_connection_refused_is_transport_error() {
    let url = closed_port_url().await;
    let client = client_for(&url, 5);

    let response = client.generate(&token(), "p").await;
    assert!(
        matches!(response, ModelResponse::Transport(_)),
        "got {response:?}"
    );
    assert!(response.to_string().starts_with("Error: request failed - "));
}

#[tokio::test]
async fn test_token_exchange_posts_signed_assertion() {
    let server = StubServer::start(StubReply::json(
        200,
        r#"{"access_token":"ya29.exchanged","expires_in":3599,"token_type":"Bearer"}"#,
    ))
    .await;
    let token_uri = format!("{}/token", server.base_url);
    let provider = ServiceAccountTokenProvider::new(fixture_credential(token_uri.clone())).unwrap();

    let token = provider.access_token().await.unwrap();
    assert_eq!(token.secret(), "ya29.exchanged");
    assert!(!token.is_expired());

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].request_line(), "POST /token HTTP/1.1");
    assert_eq!(
        requests[0].header("content-type").as_deref(),
        Some("application/x-www-form-urlencoded")
    );

    let form: Vec<(&str, &str)> = requests[0]
        .body
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .collect();
    assert!(form.contains(&(
        "grant_type",
        "urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer"
    )));
    let assertion = form
        .iter()
        .find(|(key, _)| *key == "assertion")
        .map(|(_, value)| *value)
        .expect("assertion field");

    let public_key = std::fs::read(fixture_path("test-public-key.pem")).unwrap();
    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[token_uri.as_str()]);
    validation.set_issuer(&["analyzer@insight-test.iam.gserviceaccount.com"]);
    let decoded = decode::<AssertionClaims>(
        assertion,
        &DecodingKey::from_rsa_pem(&public_key).unwrap(),
        &validation,
    )
    .unwrap();

    assert_eq!(decoded.header.kid.as_deref(), Some("test-key-1"));
    assert_eq!(decoded.claims.sub, decoded.claims.iss);
    assert_eq!(decoded.claims.exp - decoded.claims.iat, 3600);
    assert_eq!(decoded.claims.scope, CLOUD_PLATFORM_SCOPE);
}

#[tokio::test]
async fn test_token_exchange_rejection_is_fatal() {
    let server = StubServer::start(StubReply::json(
        400,
        r#"{"error":"invalid_grant","error_description":"Invalid JWT Signature."}"#,
    ))
    .await;
    let provider =
        ServiceAccountTokenProvider::new(fixture_credential(format!("{}/token", server.base_url)))
            .unwrap();

    let err = provider.access_token().await.unwrap_err();
    assert!(matches!(err, InsightError::Credential(_)));
    assert!(err.to_string().contains("400"));
    assert!(err.to_string().contains("invalid_grant"));
}

#[tokio::test]
async fn test_token_exchange_unreachable_is_fatal() {
    let url = closed_port_url().await;
    let provider =
        ServiceAccountTokenProvider::new(fixture_credential(format!("{url}/token"))).unwrap();

    let err = provider.access_token().await.unwrap_err();
    assert!(matches!(err, InsightError::Credential(_)));
}
