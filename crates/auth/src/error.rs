use http::StatusCode;

use crate::HttpAction;

/// Errors raised by an identity client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The user agent must perform an action before credentials can be produced.
    #[error("{}", .0.message())]
    Challenge(HttpAction),
    /// The client failed for reasons unrelated to the caller.
    #[error("{0}")]
    Technical(String),
}

/// Errors that can occur in profile store backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Internal storage error.
    #[error("Profile store error: {0}")]
    Internal(String),
}

/// Errors raised while building the client registry or a filter over it.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Two clients share the same name.
    #[error("Client {0} is registered more than once")]
    DuplicateClient(String),
    /// A filter is configured with a client missing from the registry.
    #[error("Client {0} is not registered")]
    UnknownClient(String),
}

/// Reasons the authentication filter stops a request.
///
/// Only [`AuthError::Challenge`] asks the caller to retry after an external action; every other
/// variant is a final answer for the request.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No configured client matches the requested client name.
    #[error("No client matches '{0}'")]
    NoClient(String),
    /// The client requires an HTTP action, passed through unchanged.
    #[error("Authentication challenge: {}", .0.message())]
    Challenge(HttpAction),
    /// Credentials were extracted but no profile could be resolved from them.
    #[error("Client {0} could not resolve a user profile")]
    NoProfile(String),
    /// The client failed internally.
    #[error("Authentication failed: {0}")]
    Technical(String),
    /// The profile store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    /// The HTTP status the request is answered with.
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::NoClient(_) | AuthError::NoProfile(_) => StatusCode::UNAUTHORIZED,
            AuthError::Challenge(action) => action.status(),
            AuthError::Technical(_) | AuthError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The challenge to complete, if this is not a plain denial.
    pub fn challenge(&self) -> Option<&HttpAction> {
        match self {
            AuthError::Challenge(action) => Some(action),
            _ => None,
        }
    }
}

impl From<ClientError> for AuthError {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::Challenge(action) => AuthError::Challenge(action),
            ClientError::Technical(message) => AuthError::Technical(message),
        }
    }
}
