use std::sync::Arc;

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use config::BasicAuthClientConfig;
use http::header::AUTHORIZATION;

use super::authenticate;
use crate::{Authenticator, Client, ClientError, ClientKind, Credentials, HttpAction, UserProfile, WebContext};

const BASIC_SCHEME_LENGTH: usize = 5;

/// Direct client for HTTP basic authentication.
pub struct BasicAuthClient {
    realm: String,
    authenticator: Arc<dyn Authenticator>,
}

impl BasicAuthClient {
    /// Creates the client from its configuration.
    pub fn new(config: &BasicAuthClientConfig, authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            realm: config.realm.clone(),
            authenticator,
        }
    }

    fn challenge(&self, message: &str) -> ClientError {
        let www_authenticate = format!("Basic realm=\"{}\"", self.realm.replace('"', "'"));
        ClientError::Challenge(HttpAction::unauthorized(message, Some(www_authenticate)))
    }
}

#[async_trait]
impl Client for BasicAuthClient {
    fn kind(&self) -> ClientKind {
        ClientKind::Basic
    }

    fn credentials(&self, context: &dyn WebContext) -> Result<Credentials, ClientError> {
        let value = context
            .request_header(AUTHORIZATION.as_str())
            .ok_or_else(|| self.challenge("missing credentials"))?;

        if value.len() <= BASIC_SCHEME_LENGTH
            || !value.is_char_boundary(BASIC_SCHEME_LENGTH)
            || !value[..BASIC_SCHEME_LENGTH].eq_ignore_ascii_case("basic")
            || !value[BASIC_SCHEME_LENGTH..].starts_with(' ')
        {
            return Err(self.challenge("credentials must use the Basic scheme"));
        }

        let decoded = STANDARD
            .decode(value[BASIC_SCHEME_LENGTH + 1..].trim())
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .ok_or_else(|| self.challenge("malformed credentials"))?;

        let (username, password) = decoded
            .split_once(':')
            .ok_or_else(|| self.challenge("malformed credentials"))?;

        if username.is_empty() {
            return Err(self.challenge("missing username"));
        }

        Ok(Credentials::username_password(username, password))
    }

    async fn user_profile(
        &self,
        credentials: &Credentials,
        _context: &dyn WebContext,
    ) -> Result<Option<UserProfile>, ClientError> {
        authenticate(self, &self.authenticator, credentials).await
    }
}
