use integration_tests::TestServer;

use super::CONFIG;

const CALLBACK: &str = "/callback?client_name=FormClient";

fn location(response: &reqwest::Response) -> &str {
    response.headers().get("location").unwrap().to_str().unwrap()
}

#[tokio::test]
async fn unauthenticated_request_is_sent_to_the_login_page() {
    let server = TestServer::start(CONFIG).await;

    let response = server.client.get("/whoami?client_name=FormClient").await;
    assert_eq!(response.status(), 302);
    assert_eq!(location(&response), "/login?redirect=%2Fwhoami%3Fclient_name%3DFormClient");

    let body = response.text().await.unwrap();
    insta::assert_snapshot!(body, @r#"{"error":"login_required","error_description":"redirect to /login?redirect=%2Fwhoami%3Fclient_name%3DFormClient"}"#);
}

#[tokio::test]
async fn login_page_posts_to_the_callback() {
    let server = TestServer::start(CONFIG).await;

    let response = server.client.get("/login?redirect=/whoami&error=invalid_credentials").await;
    assert_eq!(response.status(), 200);

    let body = response.text().await.unwrap();
    assert!(body.contains(r#"<form method="post" action="/callback?client_name=FormClient">"#));
    assert!(body.contains(r#"<input type="hidden" name="redirect" value="/whoami">"#));
    assert!(body.contains("Invalid username or password."));
}

#[tokio::test]
async fn login_page_drops_foreign_redirects() {
    let server = TestServer::start(CONFIG).await;

    let response = server.client.get("/login?redirect=https://evil.example/").await;
    assert_eq!(response.status(), 200);

    let body = response.text().await.unwrap();
    assert!(body.contains(r#"<input type="hidden" name="redirect" value="/">"#));
}

#[tokio::test]
async fn successful_login_binds_the_profile_to_the_session() {
    let server = TestServer::start(CONFIG).await;

    let response = server
        .client
        .post_form(CALLBACK, &[("username", "jane"), ("password", "s3cret"), ("redirect", "/whoami")])
        .await;

    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/whoami");

    let cookie = response.headers().get("set-cookie").unwrap().to_str().unwrap();
    assert!(cookie.starts_with("trellis.sid="));
    assert!(cookie.contains("HttpOnly"));

    let response = server.client.get("/whoami").await;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    insta::assert_json_snapshot!(body, @r#"
    {
      "attributes": {
        "email": "jane@example.com",
        "username": "jane"
      },
      "client": "FormClient",
      "id": "user-1",
      "type": "http"
    }
    "#);
}

#[tokio::test]
async fn invalid_credentials_return_to_the_login_page() {
    let server = TestServer::start(CONFIG).await;

    let response = server
        .client
        .post_form(CALLBACK, &[("username", "jane"), ("password", "wrong"), ("redirect", "/whoami")])
        .await;

    assert_eq!(response.status(), 302);
    assert_eq!(location(&response), "/login?redirect=%2Fwhoami&error=invalid_credentials");
    assert!(response.headers().get("set-cookie").is_none());

    let response = server.client.get("/whoami").await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn missing_password_returns_to_the_login_page() {
    let server = TestServer::start(CONFIG).await;

    let response = server
        .client
        .post_form(CALLBACK, &[("username", "jane"), ("redirect", "/whoami")])
        .await;

    assert_eq!(response.status(), 302);
    assert_eq!(location(&response), "/login?redirect=%2Fwhoami&error=missing_credentials");
}
