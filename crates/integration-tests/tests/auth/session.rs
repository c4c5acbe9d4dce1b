use integration_tests::TestServer;

use super::CONFIG;

#[tokio::test]
async fn session_outlives_the_credentials() {
    let server = TestServer::start(CONFIG).await;

    let response = server.client.get("/whoami?token=abc").await;
    assert_eq!(response.status(), 200);
    assert!(response.headers().get("set-cookie").is_some());

    let response = server.client.get("/whoami").await;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["id"], "123");
    assert_eq!(body["client"], "ParameterClient");
}

#[tokio::test]
async fn sessions_are_not_shared_between_clients() {
    let server = TestServer::start(CONFIG).await;

    let response = server.client.get("/whoami?token=abc").await;
    assert_eq!(response.status(), 200);

    let response = server.new_client().get("/whoami").await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn unknown_session_cookie_is_ignored() {
    let server = TestServer::start(CONFIG).await;

    let response = server
        .client
        .get_with_header("/whoami", "cookie", "trellis.sid=not-a-session")
        .await;

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn logout_ends_the_session() {
    let server = TestServer::start(CONFIG).await;

    let response = server.client.get("/whoami?token=abc").await;
    assert_eq!(response.status(), 200);

    let response = server.client.get("/logout?redirect=/done").await;
    assert_eq!(response.status(), 303);
    assert_eq!(response.headers().get("location").unwrap(), "/done");

    let cookie = response.headers().get("set-cookie").unwrap().to_str().unwrap();
    assert!(cookie.contains("Max-Age=0"));

    let response = server.client.get("/whoami").await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn logout_without_a_session_redirects_home() {
    let server = TestServer::start(CONFIG).await;

    let response = server.client.post_form("/logout", &[]).await;
    assert_eq!(response.status(), 303);
    assert_eq!(response.headers().get("location").unwrap(), "/");
    assert!(response.headers().get("set-cookie").is_none());
}
