use std::sync::Arc;

use config::{AuthConfig, ClientConfig};

use crate::{
    Authenticator, BasicAuthClient, Client, FormClient, HeaderClient, ParameterClient, RegistryError,
    StaticAuthenticator,
};

/// The configured identity clients, in registration order.
///
/// The registry is built once at startup and shared read-only between requests.
pub struct Clients {
    client_name_parameter: String,
    clients: Vec<Arc<dyn Client>>,
}

impl Clients {
    /// Creates an empty registry selecting clients with the given request parameter.
    pub fn new(client_name_parameter: impl Into<String>) -> Self {
        Self {
            client_name_parameter: client_name_parameter.into(),
            clients: Vec::new(),
        }
    }

    /// Builds the registry from the `[auth]` section, authenticating against the configured
    /// users and tokens.
    pub fn from_config(config: &AuthConfig) -> Result<Self, RegistryError> {
        let authenticator: Arc<dyn Authenticator> =
            Arc::new(StaticAuthenticator::new(config.users.clone(), config.tokens.clone()));

        let mut clients = Self::new(config.client_name_parameter.as_str());

        for client_config in &config.clients {
            let client: Arc<dyn Client> = match client_config {
                ClientConfig::Parameter(parameter) => Arc::new(ParameterClient::new(parameter, authenticator.clone())),
                ClientConfig::Header(header) => Arc::new(HeaderClient::new(header, authenticator.clone())),
                ClientConfig::Form(form) => Arc::new(FormClient::new(
                    form,
                    config.login_path.as_str(),
                    authenticator.clone(),
                )),
                ClientConfig::Basic(basic) => Arc::new(BasicAuthClient::new(basic, authenticator.clone())),
            };

            clients.register(client)?;
        }

        Ok(clients)
    }

    /// Adds a client. Names are unique within the registry.
    pub fn register(&mut self, client: Arc<dyn Client>) -> Result<(), RegistryError> {
        if self.find_by_name(client.name()).is_some() {
            return Err(RegistryError::DuplicateClient(client.name().to_string()));
        }

        log::debug!("Registered identity client {}", client.name());
        self.clients.push(client);

        Ok(())
    }

    /// The request parameter naming the client that should handle a request.
    pub fn client_name_parameter(&self) -> &str {
        &self.client_name_parameter
    }

    /// Looks a client up by its exact name.
    pub fn find_by_name(&self, name: &str) -> Option<&Arc<dyn Client>> {
        self.clients.iter().find(|client| client.name() == name)
    }

    /// The registered clients, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Client>> {
        self.clients.iter()
    }

    /// Number of registered clients.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Whether no client is registered.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use config::{FormClientConfig, HeaderClientConfig, ParameterClientConfig};

    use super::*;
    use crate::client::test_support::authenticator;

    #[test]
    fn builds_clients_in_configured_order() {
        let config = AuthConfig {
            clients: vec![
                ClientConfig::Header(HeaderClientConfig::default()),
                ClientConfig::Parameter(ParameterClientConfig::default()),
                ClientConfig::Form(FormClientConfig::default()),
            ],
            ..Default::default()
        };

        let clients = Clients::from_config(&config).unwrap();
        let names: Vec<_> = clients.iter().map(|client| client.name()).collect();

        assert_eq!(names, ["HeaderClient", "ParameterClient", "FormClient"]);
        assert_eq!(clients.client_name_parameter(), "client_name");
        assert!(clients.find_by_name("FormClient").is_some());
        assert!(clients.find_by_name("formclient").is_none());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut clients = Clients::new("client_name");
        let client = || Arc::new(ParameterClient::new(&ParameterClientConfig::default(), authenticator()));

        clients.register(client()).unwrap();
        let error = clients.register(client()).unwrap_err();

        assert_eq!(error.to_string(), "Client ParameterClient is registered more than once");
        assert_eq!(clients.len(), 1);
    }
}
