//! Authentication filter configuration.

use std::{collections::BTreeMap, time::Duration};

use duration_str::deserialize_duration;
use secrecy::SecretString;
use serde::Deserialize;

/// Authentication filter configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Whether the application routes are protected by the authentication filter.
    pub enabled: bool,
    /// Request parameter selecting which configured client handles a request.
    pub client_name_parameter: String,
    /// Path of the login form served to form clients.
    pub login_path: String,
    /// Path the login form posts its credentials to.
    pub callback_path: String,
    /// Path invalidating the current session profile.
    pub logout_path: String,
    /// Identity clients, in resolution order.
    pub clients: Vec<ClientConfig>,
    /// Profile store settings.
    pub store: ProfileStoreConfig,
    /// Users known to username/password clients.
    pub users: Vec<UserConfig>,
    /// Tokens known to token clients.
    pub tokens: Vec<TokenConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            client_name_parameter: "client_name".to_string(),
            login_path: "/login".to_string(),
            callback_path: "/callback".to_string(),
            logout_path: "/logout".to_string(),
            clients: Vec::new(),
            store: ProfileStoreConfig::default(),
            users: Vec::new(),
            tokens: Vec::new(),
        }
    }
}

/// An identity client definition.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientConfig {
    /// Token read from a request parameter.
    Parameter(ParameterClientConfig),
    /// Token read from a request header.
    Header(HeaderClientConfig),
    /// Username and password posted from the login form.
    Form(FormClientConfig),
    /// HTTP basic authentication.
    Basic(BasicAuthClientConfig),
}

impl ClientConfig {
    /// The simple name of the client type, which is also its name in the client registry.
    pub fn simple_name(&self) -> &'static str {
        match self {
            ClientConfig::Parameter(_) => "ParameterClient",
            ClientConfig::Header(_) => "HeaderClient",
            ClientConfig::Form(_) => "FormClient",
            ClientConfig::Basic(_) => "BasicAuthClient",
        }
    }

    /// Whether the client authenticates against configured users rather than tokens.
    pub fn uses_passwords(&self) -> bool {
        matches!(self, ClientConfig::Form(_) | ClientConfig::Basic(_))
    }
}

/// Parameter client settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParameterClientConfig {
    /// Name of the parameter carrying the token.
    pub parameter_name: String,
    /// Accept the token on GET requests.
    pub supports_get: bool,
    /// Accept the token on POST requests.
    pub supports_post: bool,
}

impl Default for ParameterClientConfig {
    fn default() -> Self {
        Self {
            parameter_name: "token".to_string(),
            supports_get: true,
            supports_post: false,
        }
    }
}

/// Header client settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeaderClientConfig {
    /// Name of the header carrying the token.
    pub header_name: String,
    /// Scheme expected before the token, matched case-insensitively. Empty for a bare token.
    pub prefix: String,
}

impl Default for HeaderClientConfig {
    fn default() -> Self {
        Self {
            header_name: "Authorization".to_string(),
            prefix: "Bearer".to_string(),
        }
    }
}

/// Form client settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormClientConfig {
    /// Form field holding the username.
    pub username_parameter: String,
    /// Form field holding the password.
    pub password_parameter: String,
}

impl Default for FormClientConfig {
    fn default() -> Self {
        Self {
            username_parameter: "username".to_string(),
            password_parameter: "password".to_string(),
        }
    }
}

/// Basic authentication client settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BasicAuthClientConfig {
    /// Realm announced in the `WWW-Authenticate` challenge.
    pub realm: String,
}

impl Default for BasicAuthClientConfig {
    fn default() -> Self {
        Self {
            realm: "authentication required".to_string(),
        }
    }
}

/// In-memory profile store settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileStoreConfig {
    /// Maximum number of stored profiles.
    pub max_size: u64,
    /// Profiles not read for this long are evicted.
    #[serde(deserialize_with = "deserialize_duration")]
    pub idle_timeout: Duration,
}

impl Default for ProfileStoreConfig {
    fn default() -> Self {
        Self {
            max_size: 10_000,
            idle_timeout: Duration::from_secs(60 * 60),
        }
    }
}

/// A user accepted by username/password clients.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserConfig {
    /// Login name.
    pub username: String,
    /// Login password.
    pub password: SecretString,
    /// Profile identifier. Defaults to the username.
    pub id: Option<String>,
    /// Extra profile attributes.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl UserConfig {
    /// The identifier of the profile resolved for this user.
    pub fn profile_id(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.username)
    }
}

/// A token accepted by token clients.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenConfig {
    /// The token value.
    pub token: SecretString,
    /// Profile identifier resolved for this token.
    pub id: String,
    /// Extra profile attributes.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}
