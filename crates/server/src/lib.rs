//! Trellis server library.
//!
//! Builds the application router around the authentication filter chain and serves it, either
//! for the binary or for the integration tests.

#![deny(missing_docs)]

mod auth;
mod error;
mod health;
mod login;
mod profile;
mod session;

use std::{net::SocketAddr, sync::Arc};

use ::auth::{AuthFilter, ClientKind, Clients, DefaultClientFinder, InMemoryProfileStore, ProfileStore};
use anyhow::anyhow;
use axum::{
    Router,
    routing::{get, post},
};
use axum_server::tls_rustls::RustlsConfig;
use config::Config;
use crate::auth::AuthLayer;
use login::LoginState;
use session::SessionLayer;
use tokio::net::TcpListener;

pub use profile::AuthenticatedProfile;

/// Configuration for serving Trellis.
pub struct ServeConfig {
    /// The socket address (IP and port) the server will bind to
    pub listen_address: SocketAddr,
    /// The deserialized Trellis TOML configuration.
    pub config: Config,
    /// The application routes, protected by the authentication filter when it is enabled.
    pub routes: Router,
}

/// Wraps the application routes with sessions, the authentication filter and the login endpoints.
///
/// Fails when the configuration is invalid or the configured identity clients cannot be assembled.
pub fn router(config: &Config, routes: Router) -> anyhow::Result<Router> {
    config.validate()?;

    let mut app = Router::new();

    if config.auth.enabled {
        let clients = Arc::new(Clients::from_config(&config.auth)?);
        let store: Arc<dyn ProfileStore> = Arc::new(InMemoryProfileStore::from_config(&config.auth.store));
        let filter = AuthFilter::for_all_clients(clients.clone(), Arc::new(DefaultClientFinder), store.clone())?;

        log::info!("Application routes protected by clients {}", filter.name());

        let state = Arc::new(LoginState::new(&config.auth, store));
        let mut protected = routes;

        if clients.find_by_name(ClientKind::Form.simple_name()).is_some() {
            protected = protected.route(&config.auth.callback_path, post(login::callback));

            let login_router = Router::new()
                .route(&config.auth.login_path, get(login::login_page))
                .with_state(state.clone());

            app = app.merge(login_router);
        }

        let logout_router = Router::new()
            .route(&config.auth.logout_path, get(login::logout).post(login::logout))
            .with_state(state);

        app = app.merge(protected.layer(AuthLayer::new(filter))).merge(logout_router);
    } else {
        log::warn!("Authentication is disabled, application routes are public");
        app = app.merge(routes);
    }

    // Health endpoint is public and served next to the app unless it has its own listener
    if config.server.health.enabled && config.server.health.listen.is_none() {
        app = app.route(&config.server.health.path, get(health::health));
    }

    Ok(app.layer(SessionLayer::new(&config.server.session)))
}

/// Starts and runs the Trellis server with the provided configuration.
pub async fn serve(
    ServeConfig {
        listen_address,
        config,
        routes,
    }: ServeConfig,
) -> anyhow::Result<()> {
    let app = router(&config, routes)?;

    if config.server.health.enabled
        && let Some(listen) = config.server.health.listen
    {
        tokio::spawn(health::bind_health_endpoint(
            listen,
            config.server.tls.clone(),
            config.server.health.clone(),
        ));
    }

    let listener = TcpListener::bind(listen_address)
        .await
        .map_err(|e| anyhow!("Failed to bind to {listen_address}: {e}"))?;

    match &config.server.tls {
        Some(tls_config) => {
            let rustls_config = RustlsConfig::from_pem_file(&tls_config.certificate, &tls_config.key)
                .await
                .map_err(|e| anyhow!("Failed to load TLS certificate and key: {e}"))?;

            log::info!("Trellis listening at: https://{listen_address}");

            axum_server::from_tcp_rustls(listener.into_std()?, rustls_config)
                .serve(app.into_make_service())
                .await
                .map_err(|e| anyhow!("Failed to start HTTPS server: {e}"))?;
        }
        None => {
            log::info!("Trellis listening at: http://{listen_address}");

            axum::serve(listener, app)
                .await
                .map_err(|e| anyhow!("Failed to start HTTP server: {}", e))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use config::{ClientConfig, FormClientConfig};

    use super::*;

    fn form_config() -> Config {
        let mut config = Config::default();
        config.auth.enabled = true;
        config.auth.clients = vec![ClientConfig::Form(FormClientConfig::default())];
        config
    }

    #[test]
    fn form_routes_are_assembled() {
        assert!(router(&form_config(), Router::new()).is_ok());
    }

    #[test]
    fn overlapping_auth_routes_are_a_startup_error() {
        for logout_path in ["/login", "/callback"] {
            let mut config = form_config();
            config.auth.logout_path = logout_path.to_string();

            let error = router(&config, Router::new()).unwrap_err();
            assert!(error.to_string().starts_with(&format!("auth.logout_path '{logout_path}'")));
        }
    }
}
