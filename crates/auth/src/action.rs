use http::StatusCode;

/// An HTTP action an identity client requires before authentication can complete.
///
/// Challenges are not failures: the caller is expected to render the action (a redirect to a
/// login page, a `WWW-Authenticate` challenge) and let the user agent retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpAction {
    status: StatusCode,
    location: Option<String>,
    www_authenticate: Option<String>,
    message: String,
}

impl HttpAction {
    /// Asks the user agent to authenticate, optionally with a `WWW-Authenticate` challenge.
    pub fn unauthorized(message: impl Into<String>, www_authenticate: Option<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            location: None,
            www_authenticate,
            message: message.into(),
        }
    }

    /// Refuses the request for the current user agent.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            location: None,
            www_authenticate: None,
            message: message.into(),
        }
    }

    /// Sends the user agent to `location`.
    pub fn redirect(location: impl Into<String>) -> Self {
        let location = location.into();

        Self {
            status: StatusCode::FOUND,
            message: format!("redirect to {location}"),
            location: Some(location),
            www_authenticate: None,
        }
    }

    /// The status code of the response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The `Location` header of a redirect.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// The `WWW-Authenticate` header of a challenge.
    pub fn www_authenticate(&self) -> Option<&str> {
        self.www_authenticate.as_deref()
    }

    /// A human readable reason.
    pub fn message(&self) -> &str {
        &self.message
    }
}
