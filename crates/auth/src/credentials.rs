use secrecy::SecretString;

/// Proof of identity extracted from a request by an identity client.
///
/// Lives for the duration of a single request. Secrets are redacted from `Debug` output.
#[derive(Debug)]
pub enum Credentials {
    /// An opaque token, e.g. an API key.
    Token(SecretString),
    /// A username and password pair.
    UsernamePassword {
        /// The login name.
        username: String,
        /// The password.
        password: SecretString,
    },
}

impl Credentials {
    /// Token credentials.
    pub fn token(token: impl Into<String>) -> Self {
        Credentials::Token(SecretString::from(token.into()))
    }

    /// Username and password credentials.
    pub fn username_password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::UsernamePassword {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}
