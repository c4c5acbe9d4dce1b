use integration_tests::TestServer;

use super::CONFIG;

#[tokio::test]
async fn parameter_token_authenticates() {
    let server = TestServer::start(CONFIG).await;

    let response = server.client.get("/whoami?client_name=ParameterClient&token=abc").await;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    insta::assert_json_snapshot!(body, @r#"
    {
      "attributes": {},
      "client": "ParameterClient",
      "id": "123",
      "type": "http"
    }
    "#);
}

#[tokio::test]
async fn first_configured_client_handles_requests_without_a_client_name() {
    let server = TestServer::start(CONFIG).await;

    let response = server.client.get("/whoami?token=abc").await;
    assert_eq!(response.status(), 200);

    let response = server.client.get_with_header("/whoami", "Authorization", "Bearer abc").await;
    // The session from the first request authenticates this one
    assert_eq!(response.status(), 200);

    let response = server.new_client().get_with_header("/whoami", "Authorization", "Bearer abc").await;
    assert_eq!(response.status(), 401);
    insta::assert_snapshot!(response.text().await.unwrap(), @r#"{"error":"unauthorized","error_description":"missing parameter 'token'"}"#);
}

#[tokio::test]
async fn rejected_token_is_denied() {
    let server = TestServer::start(CONFIG).await;

    let response = server.client.get("/whoami?token=nope").await;
    assert_eq!(response.status(), 401);
    insta::assert_snapshot!(response.text().await.unwrap(), @r#"{"error":"invalid_credentials","error_description":"Credentials were not accepted"}"#);
}

#[tokio::test]
async fn unknown_client_name_is_denied() {
    let server = TestServer::start(CONFIG).await;

    let response = server.client.get("/whoami?client_name=Nope&token=abc").await;
    assert_eq!(response.status(), 401);
    insta::assert_snapshot!(response.text().await.unwrap(), @r#"{"error":"unauthorized","error_description":"No client matches 'Nope'"}"#);
}

#[tokio::test]
async fn bearer_header_authenticates() {
    let server = TestServer::start(CONFIG).await;

    let response = server
        .client
        .get_with_header("/whoami?client_name=HeaderClient", "Authorization", "bearer abc")
        .await;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["id"], "123");
    assert_eq!(body["client"], "HeaderClient");
}

#[tokio::test]
async fn missing_bearer_header_is_challenged() {
    let server = TestServer::start(CONFIG).await;

    let response = server.client.get("/whoami?client_name=HeaderClient").await;
    assert_eq!(response.status(), 401);

    let challenge = response.headers().get("www-authenticate").unwrap().to_str().unwrap();
    assert_eq!(challenge, "Bearer");
}

#[tokio::test]
async fn basic_auth_authenticates() {
    let server = TestServer::start(CONFIG).await;

    let response = server
        .client
        .get_with_basic_auth("/whoami?client_name=BasicAuthClient", "jane", "s3cret")
        .await;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    insta::assert_json_snapshot!(body, @r#"
    {
      "attributes": {
        "email": "jane@example.com",
        "username": "jane"
      },
      "client": "BasicAuthClient",
      "id": "user-1",
      "type": "http"
    }
    "#);
}

#[tokio::test]
async fn basic_auth_challenge_names_the_realm() {
    let server = TestServer::start(CONFIG).await;

    let response = server.client.get("/whoami?client_name=BasicAuthClient").await;
    assert_eq!(response.status(), 401);

    let challenge = response.headers().get("www-authenticate").unwrap().to_str().unwrap();
    assert_eq!(challenge, r#"Basic realm="trellis""#);

    let response = server
        .new_client()
        .get_with_basic_auth("/whoami?client_name=BasicAuthClient", "jane", "wrong")
        .await;
    assert_eq!(response.status(), 401);
}
