mod basic;
mod form;
mod header;
mod parameter;

use std::sync::Arc;

use async_trait::async_trait;

pub use basic::BasicAuthClient;
pub use form::FormClient;
pub use header::HeaderClient;
pub use parameter::ParameterClient;

use crate::{Authenticator, ClientError, Credentials, ProfileType, UserProfile, WebContext};

/// The identity client types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientKind {
    /// See [`ParameterClient`].
    Parameter,
    /// See [`HeaderClient`].
    Header,
    /// See [`FormClient`].
    Form,
    /// See [`BasicAuthClient`].
    Basic,
}

impl ClientKind {
    /// The simple type name, used as the client name.
    pub fn simple_name(self) -> &'static str {
        match self {
            ClientKind::Parameter => "ParameterClient",
            ClientKind::Header => "HeaderClient",
            ClientKind::Form => "FormClient",
            ClientKind::Basic => "BasicAuthClient",
        }
    }
}

/// A strategy extracting credentials from a request and resolving them to a profile.
#[async_trait]
pub trait Client: Send + Sync {
    /// The type of the client.
    fn kind(&self) -> ClientKind;

    /// The name the client is registered and selected under.
    fn name(&self) -> &str {
        self.kind().simple_name()
    }

    /// The runtime type of the profiles this client resolves.
    fn profile_type(&self) -> ProfileType {
        ProfileType::Http
    }

    /// Extracts credentials from the request.
    ///
    /// A [`ClientError::Challenge`] tells the caller what the user agent must do before
    /// credentials can be produced.
    fn credentials(&self, context: &dyn WebContext) -> Result<Credentials, ClientError>;

    /// Resolves the profile the credentials belong to, `None` if they are not recognized.
    async fn user_profile(
        &self,
        credentials: &Credentials,
        context: &dyn WebContext,
    ) -> Result<Option<UserProfile>, ClientError>;
}

/// Runs the authenticator and stamps the resolved profile with the client's name and type.
async fn authenticate(
    client: &dyn Client,
    authenticator: &Arc<dyn Authenticator>,
    credentials: &Credentials,
) -> Result<Option<UserProfile>, ClientError> {
    let profile = authenticator.authenticate(credentials).await?;

    Ok(profile.map(|profile| {
        profile
            .with_profile_type(client.profile_type())
            .with_client_name(client.name())
    }))
}
