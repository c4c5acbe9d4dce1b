use std::net::SocketAddr;
use std::sync::Once;
use std::time::Duration;

use axum::{Json, Router, routing::get};
use config::Config;
use server::{AuthenticatedProfile, ServeConfig};
use tokio::net::TcpListener;
use tokio::time::timeout;

static INIT: Once = Once::new();

fn init_crypto_provider() {
    INIT.call_once(|| {
        rustls::crypto::aws_lc_rs::default_provider()
            .install_default()
            .expect("Failed to install default crypto provider");
    });
}

/// The application routes the test server protects.
fn routes() -> Router {
    Router::new()
        .route("/", get(|| async { "Trellis is running" }))
        .route("/whoami", get(whoami))
}

async fn whoami(AuthenticatedProfile(profile): AuthenticatedProfile) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "id": profile.id(),
        "type": profile.profile_type(),
        "client": profile.client_name(),
        "attributes": profile.attributes(),
    }))
}

/// Test client for making HTTP requests to the test server.
///
/// Each client keeps its own cookie jar, so a client is one browser session. Redirects are
/// returned to the test instead of being followed.
pub struct TestClient {
    base_url: String,
    client: reqwest::Client,
}

impl TestClient {
    /// Create a new test client for the given base URL
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to create test client");

        Self { base_url, client }
    }

    /// Send a GET request to the given path
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.request(reqwest::Method::GET, path).send().await.unwrap()
    }

    /// Send a GET request with an extra header
    pub async fn get_with_header(&self, path: &str, name: &str, value: &str) -> reqwest::Response {
        self.request(reqwest::Method::GET, path)
            .header(name, value)
            .send()
            .await
            .unwrap()
    }

    /// Send a GET request with basic credentials
    pub async fn get_with_basic_auth(&self, path: &str, username: &str, password: &str) -> reqwest::Response {
        self.request(reqwest::Method::GET, path)
            .basic_auth(username, Some(password))
            .send()
            .await
            .unwrap()
    }

    /// Send a POST request with an url-encoded form body
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.request(reqwest::Method::POST, path).form(form).send().await.unwrap()
    }

    /// Start building a request to the given path
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client.request(method, format!("{}{}", self.base_url, path))
    }
}

/// Test server that manages the lifecycle of a server instance
pub struct TestServer {
    pub client: TestClient,
    pub address: SocketAddr,
    _handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server with the given TOML configuration
    pub async fn start(config_toml: &str) -> Self {
        // Initialize crypto provider for rustls
        init_crypto_provider();

        let config: Config = toml::from_str(config_toml).unwrap();

        if let Err(e) = config.validate() {
            panic!("Invalid test configuration: {e}");
        }

        // Find an available port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        let serve_config = ServeConfig {
            listen_address: address,
            config,
            routes: routes(),
        };

        // Start the server in a background task
        let (tx, mut rx) = tokio::sync::oneshot::channel();
        let handle = tokio::spawn(async move {
            // Drop the listener so the server can bind to the address
            drop(listener);

            let _ = tx.send(server::serve(serve_config).await);
        });

        // Wait for the server to start up or fail
        tokio::time::sleep(Duration::from_millis(100)).await;

        if let Ok(Err(e)) = rx.try_recv() {
            eprintln!("Server failed to start: {e}");
            std::process::exit(1);
        }

        let client = TestClient::new(format!("http://{address}"));

        // Verify the server is actually running by making a simple request
        let mut retries = 10;
        while retries > 0 {
            if timeout(Duration::from_millis(100), client.get("/")).await.is_ok() {
                break;
            }
            retries -= 1;
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        TestServer {
            client,
            address,
            _handle: handle,
        }
    }

    /// A client with an empty cookie jar, i.e. a new browser session
    pub fn new_client(&self) -> TestClient {
        TestClient::new(format!("http://{}", self.address))
    }
}
