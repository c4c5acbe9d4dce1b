use std::sync::Arc;

use async_trait::async_trait;
use config::FormClientConfig;
use http::Method;
use url::form_urlencoded;

use super::authenticate;
use crate::{Authenticator, Client, ClientError, ClientKind, Credentials, HttpAction, UserProfile, WebContext};

/// Indirect client authenticating with a username and password posted from a login form.
///
/// Requests without credentials are redirected to the login page, which posts back to the
/// callback path. Rejected credentials send the user back to the login page as well.
pub struct FormClient {
    login_path: String,
    username_parameter: String,
    password_parameter: String,
    authenticator: Arc<dyn Authenticator>,
}

impl FormClient {
    /// Parameter carrying the URL to return to after a successful login.
    pub const REDIRECT_PARAMETER: &'static str = "redirect";

    /// Parameter carrying the reason the login page is shown again.
    pub const ERROR_PARAMETER: &'static str = "error";

    /// Creates the client from its configuration and the path of the login page.
    pub fn new(config: &FormClientConfig, login_path: impl Into<String>, authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            login_path: login_path.into(),
            username_parameter: config.username_parameter.clone(),
            password_parameter: config.password_parameter.clone(),
            authenticator,
        }
    }

    /// Redirect to the login page, remembering where the user was going.
    fn login_redirect(&self, context: &dyn WebContext, error: Option<&str>) -> HttpAction {
        let target = match context.request_parameter(Self::REDIRECT_PARAMETER) {
            Some(target) => target,
            None if context.request_method() == Method::GET => context.full_request_url(),
            None => "/",
        };

        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair(Self::REDIRECT_PARAMETER, target);

        if let Some(error) = error {
            query.append_pair(Self::ERROR_PARAMETER, error);
        }

        HttpAction::redirect(format!("{}?{}", self.login_path, query.finish()))
    }
}

#[async_trait]
impl Client for FormClient {
    fn kind(&self) -> ClientKind {
        ClientKind::Form
    }

    fn credentials(&self, context: &dyn WebContext) -> Result<Credentials, ClientError> {
        let username = context
            .request_parameter(&self.username_parameter)
            .filter(|value| !value.is_empty());

        let password = context.request_parameter(&self.password_parameter);

        match (username, password) {
            (Some(username), Some(password)) => Ok(Credentials::username_password(username, password)),
            (None, None) if context.request_method() != Method::POST => {
                Err(ClientError::Challenge(self.login_redirect(context, None)))
            }
            _ => Err(ClientError::Challenge(
                self.login_redirect(context, Some("missing_credentials")),
            )),
        }
    }

    async fn user_profile(
        &self,
        credentials: &Credentials,
        context: &dyn WebContext,
    ) -> Result<Option<UserProfile>, ClientError> {
        match authenticate(self, &self.authenticator, credentials).await? {
            Some(profile) => Ok(Some(profile)),
            None => Err(ClientError::Challenge(
                self.login_redirect(context, Some("invalid_credentials")),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use http::{Request, StatusCode};

    use super::*;
    use crate::client::test_support::{authenticator, context, get};

    fn client() -> FormClient {
        FormClient::new(&FormClientConfig::default(), "/login", authenticator())
    }

    fn post(body: &[u8]) -> crate::HttpWebContext {
        context(
            Request::builder()
                .method("POST")
                .uri("/callback?client_name=FormClient")
                .body(())
                .unwrap(),
        )
        .with_form(body)
    }

    #[test]
    fn unauthenticated_get_redirects_to_login() {
        let Err(ClientError::Challenge(action)) = client().credentials(&get("/private/page?x=1")) else {
            unreachable!("expected a challenge");
        };

        assert_eq!(action.status(), StatusCode::FOUND);
        assert_eq!(action.location(), Some("/login?redirect=%2Fprivate%2Fpage%3Fx%3D1"));
    }

    #[test]
    fn incomplete_form_returns_to_login_with_error() {
        let Err(ClientError::Challenge(action)) = client().credentials(&post(b"username=jane&redirect=%2Fprivate"))
        else {
            unreachable!("expected a challenge");
        };

        assert_eq!(
            action.location(),
            Some("/login?redirect=%2Fprivate&error=missing_credentials")
        );
    }

    #[tokio::test]
    async fn valid_form_resolves_profile() {
        let client = client();
        let context = post(b"username=jane&password=s3cret");

        let credentials = client.credentials(&context).unwrap();
        let profile = client.user_profile(&credentials, &context).await.unwrap().unwrap();

        assert_eq!(profile.id(), "jane");
        assert_eq!(profile.client_name(), Some("FormClient"));
    }

    #[tokio::test]
    async fn rejected_form_returns_to_login() {
        let client = client();
        let context = post(b"username=jane&password=wrong&redirect=%2Fprivate");

        let credentials = client.credentials(&context).unwrap();

        let Err(ClientError::Challenge(action)) = client.user_profile(&credentials, &context).await else {
            unreachable!("expected a challenge");
        };

        assert_eq!(
            action.location(),
            Some("/login?redirect=%2Fprivate&error=invalid_credentials")
        );
    }
}
