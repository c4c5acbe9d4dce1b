use std::sync::Arc;

use async_trait::async_trait;
use config::HeaderClientConfig;

use super::authenticate;
use crate::{Authenticator, Client, ClientError, ClientKind, Credentials, HttpAction, UserProfile, WebContext};

/// Direct client reading a token from a request header, e.g. `Authorization: Bearer <token>`.
pub struct HeaderClient {
    header_name: String,
    prefix: String,
    authenticator: Arc<dyn Authenticator>,
}

impl HeaderClient {
    /// Creates the client from its configuration.
    pub fn new(config: &HeaderClientConfig, authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            header_name: config.header_name.clone(),
            prefix: config.prefix.trim().to_string(),
            authenticator,
        }
    }

    fn challenge(&self, message: &str) -> ClientError {
        let www_authenticate = (!self.prefix.is_empty()).then(|| self.prefix.clone());
        ClientError::Challenge(HttpAction::unauthorized(message, www_authenticate))
    }

    /// Strips the scheme prefix, matched case-insensitively and followed by a single space.
    fn token<'a>(&self, value: &'a str) -> Option<&'a str> {
        let prefix_length = self.prefix.len();

        if prefix_length == 0 {
            return Some(value.trim());
        }

        if value.len() > prefix_length
            && value.is_char_boundary(prefix_length)
            && value[..prefix_length].eq_ignore_ascii_case(&self.prefix)
            && value[prefix_length..].starts_with(' ')
        {
            return Some(value[prefix_length + 1..].trim());
        }

        None
    }
}

#[async_trait]
impl Client for HeaderClient {
    fn kind(&self) -> ClientKind {
        ClientKind::Header
    }

    fn credentials(&self, context: &dyn WebContext) -> Result<Credentials, ClientError> {
        let value = context
            .request_header(&self.header_name)
            .ok_or_else(|| self.challenge("missing token"))?;

        match self.token(value) {
            Some(token) if !token.is_empty() => Ok(Credentials::token(token)),
            Some(_) => Err(self.challenge("missing token")),
            None => Err(self.challenge(&format!("token must be prefixed with {}", self.prefix))),
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

#[cfg(test)]
mod tests {
    use http::Request;

    use super::*;
    use crate::client::test_support::{authenticator, context};

    fn with_header(name: &str, value: &str) -> crate::HttpWebContext {
        context(Request::builder().uri("/").header(name, value).body(()).unwrap())
    }

    fn client(config: HeaderClientConfig) -> HeaderClient {
        HeaderClient::new(&config, authenticator())
    }

    #[tokio::test]
    async fn bearer_scheme_is_case_insensitive() {
        let client = client(HeaderClientConfig::default());

        for value in ["Bearer abc", "bearer abc", "BEARER abc"] {
            let context = with_header("Authorization", value);
            let credentials = client.credentials(&context).unwrap();
            let profile = client.user_profile(&credentials, &context).await.unwrap().unwrap();

            assert_eq!(profile.id(), "123");
        }
    }

    #[test]
    fn malformed_values_are_challenged() {
        let client = client(HeaderClientConfig::default());

        for (value, message) in [
            ("Bearer", "token must be prefixed with Bearer"),
            ("Bearer ", "missing token"),
            ("Token abc", "token must be prefixed with Bearer"),
            ("Bearerabc", "token must be prefixed with Bearer"),
        ] {
            let Err(ClientError::Challenge(action)) = client.credentials(&with_header("Authorization", value)) else {
                unreachable!("expected a challenge for {value:?}");
            };

            assert_eq!(action.message(), message, "{value:?}");
            assert_eq!(action.www_authenticate(), Some("Bearer"));
        }
    }

    #[test]
    fn bare_token_header() {
        let client = client(HeaderClientConfig {
            header_name: "X-Api-Key".to_string(),
            prefix: String::new(),
        });

        assert!(matches!(
            client.credentials(&with_header("X-Api-Key", "abc")),
            Ok(Credentials::Token(_))
        ));

        let Err(ClientError::Challenge(action)) = client.credentials(&with_header("Authorization", "Bearer abc"))
        else {
            unreachable!("expected a challenge");
        };

        assert_eq!(action.www_authenticate(), None);
    }
}
