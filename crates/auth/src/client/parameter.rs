use std::sync::Arc;

use async_trait::async_trait;
use config::ParameterClientConfig;
use http::Method;

use super::authenticate;
use crate::{Authenticator, Client, ClientError, ClientKind, Credentials, HttpAction, UserProfile, WebContext};

/// Direct client reading a token from a request parameter.
pub struct ParameterClient {
    parameter_name: String,
    supports_get: bool,
    supports_post: bool,
    authenticator: Arc<dyn Authenticator>,
}

impl ParameterClient {
    /// Creates the client from its configuration.
    pub fn new(config: &ParameterClientConfig, authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            parameter_name: config.parameter_name.clone(),
            supports_get: config.supports_get,
            supports_post: config.supports_post,
            authenticator,
        }
    }

    fn supports(&self, method: &Method) -> bool {
        match *method {
            Method::GET => self.supports_get,
            Method::POST => self.supports_post,
            _ => false,
        }
    }
}

#[async_trait]
impl Client for ParameterClient {
    fn kind(&self) -> ClientKind {
        ClientKind::Parameter
    }

    fn credentials(&self, context: &dyn WebContext) -> Result<Credentials, ClientError> {
        let method = context.request_method();

        if !self.supports(method) {
            return Err(ClientError::Challenge(HttpAction::unauthorized(
                format!("parameter '{}' is not accepted on {method} requests", self.parameter_name),
                None,
            )));
        }

        match context.request_parameter(&self.parameter_name) {
            Some(token) if !token.is_empty() => Ok(Credentials::token(token)),
            _ => Err(ClientError::Challenge(HttpAction::unauthorized(
                format!("missing parameter '{}'", self.parameter_name),
                None,
            ))),
        }
    }

    async fn user_profile(
        &self,
        credentials: &Credentials,
        _context: &dyn WebContext,
    ) -> Result<Option<UserProfile>, ClientError> {
        authenticate(self, &self.authenticator, credentials).await
    }
}
