mod auth;

use indoc::indoc;
use integration_tests::TestServer;

#[tokio::test]
async fn health_endpoint_enabled() {
    let config = indoc! {r#"
        [server.health]
        enabled = true
    "#};

    let server = TestServer::start(config).await;
    let response = server.client.get("/health").await;
    assert_eq!(response.status(), 200);

    let body = response.text().await.unwrap();
    insta::assert_snapshot!(body, @r#"{"status":"healthy"}"#);
}

#[tokio::test]
async fn health_endpoint_disabled() {
    let config = indoc! {r#"
        [server.health]
        enabled = false
    "#};

    let server = TestServer::start(config).await;
    let response = server.client.get("/health").await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn health_endpoint_custom_path() {
    let config = indoc! {r#"
        [server.health]
        path = "/status"
    "#};

    let server = TestServer::start(config).await;
    let response = server.client.get("/status").await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn routes_are_public_without_auth() {
    let server = TestServer::start("").await;

    let response = server.client.get("/").await;
    assert_eq!(response.status(), 200);
    insta::assert_snapshot!(response.text().await.unwrap(), @"Trellis is running");

    // Nothing authenticated the request, so the profile extractor still refuses it
    let response = server.client.get("/whoami?token=abc").await;
    assert_eq!(response.status(), 401);
    insta::assert_snapshot!(response.text().await.unwrap(), @r#"{"error":"unauthorized"}"#);
}
