use async_trait::async_trait;
use config::{TokenConfig, UserConfig};
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

use crate::{ClientError, Credentials, ProfileType, UserProfile};

/// Validates credentials and resolves the profile they belong to.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Returns `Ok(None)` when the credentials are not recognized.
    async fn authenticate(&self, credentials: &Credentials) -> Result<Option<UserProfile>, ClientError>;
}

/// Authenticator over the users and tokens of the configuration file.
pub struct StaticAuthenticator {
    users: Vec<UserConfig>,
    tokens: Vec<TokenConfig>,
}

impl StaticAuthenticator {
    /// Creates the authenticator from configured users and tokens.
    pub fn new(users: Vec<UserConfig>, tokens: Vec<TokenConfig>) -> Self {
        Self { users, tokens }
    }

    fn user_profile(user: &UserConfig) -> UserProfile {
        user.attributes.iter().fold(
            UserProfile::new(user.profile_id(), ProfileType::Common).with_attribute("username", user.username.as_str()),
            |profile, (name, value)| profile.with_attribute(name.as_str(), value.as_str()),
        )
    }

    fn token_profile(token: &TokenConfig) -> UserProfile {
        token.attributes.iter().fold(
            UserProfile::new(token.id.as_str(), ProfileType::Common),
            |profile, (name, value)| profile.with_attribute(name.as_str(), value.as_str()),
        )
    }
}

#[async_trait]
impl Authenticator for StaticAuthenticator {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Option<UserProfile>, ClientError> {
        let profile = match credentials {
            Credentials::Token(token) => self
                .tokens
                .iter()
                .find(|candidate| secrets_match(&candidate.token, token))
                .map(Self::token_profile),
            Credentials::UsernamePassword { username, password } => self
                .users
                .iter()
                .find(|user| &user.username == username)
                .filter(|user| secrets_match(&user.password, password))
                .map(Self::user_profile),
        };

        if profile.is_none() {
            log::debug!("Credentials rejected by the static authenticator");
        }

        Ok(profile)
    }
}

/// Compares two secrets in constant time.
fn secrets_match(expected: &SecretString, given: &SecretString) -> bool {
    expected
        .expose_secret()
        .as_bytes()
        .ct_eq(given.expose_secret().as_bytes())
        .into()
}
