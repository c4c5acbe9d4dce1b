use std::sync::Arc;

use crate::{
    AUTH_ID, AuthError, ClientFinder, ClientKind, Clients, ProfileStore, ProfileType, RegistryError,
    RequestAttributes, UserProfile, WebContext,
};

/// Authenticates requests with a fixed set of identity clients.
///
/// For every request the filter resolves the client to use, then either restores the profile
/// bound to the session or asks the client to extract credentials and resolve a new profile.
/// A resolved profile is bound to the session and seeded into the request attributes under
/// every profile type it satisfies.
pub struct AuthFilter {
    name: String,
    client_kinds: Vec<ClientKind>,
    seed_types: Vec<ProfileType>,
    clients: Arc<Clients>,
    finder: Arc<dyn ClientFinder>,
    store: Arc<dyn ProfileStore>,
}

impl AuthFilter {
    /// Creates a filter for the given (client, profile type) pairs.
    ///
    /// Every configured client must be present in the registry.
    pub fn new(
        configuration: &[(ClientKind, ProfileType)],
        clients: Arc<Clients>,
        finder: Arc<dyn ClientFinder>,
        store: Arc<dyn ProfileStore>,
    ) -> Result<Self, RegistryError> {
        let mut client_kinds = Vec::with_capacity(configuration.len());

        for (kind, _) in configuration {
            if clients.find_by_name(kind.simple_name()).is_none() {
                return Err(RegistryError::UnknownClient(kind.simple_name().to_string()));
            }

            if !client_kinds.contains(kind) {
                client_kinds.push(*kind);
            }
        }

        let name = client_kinds
            .iter()
            .map(|kind| kind.simple_name())
            .collect::<Vec<_>>()
            .join(",");

        let seed_types = seed_types(configuration.iter().map(|(_, profile_type)| *profile_type));

        Ok(Self {
            name,
            client_kinds,
            seed_types,
            clients,
            finder,
            store,
        })
    }

    /// Creates a filter over every registered client and the profile type it resolves.
    pub fn for_all_clients(
        clients: Arc<Clients>,
        finder: Arc<dyn ClientFinder>,
        store: Arc<dyn ProfileStore>,
    ) -> Result<Self, RegistryError> {
        let configuration: Vec<_> = clients
            .iter()
            .map(|client| (client.kind(), client.profile_type()))
            .collect();

        Self::new(&configuration, clients, finder, store)
    }

    /// The client names used when the request does not name a client.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends a name to the default client list.
    pub fn set_name(&mut self, name: &str) {
        self.name.push(',');
        self.name.push_str(name);
    }

    /// The profile types seeded for the configured clients, ending with [`ProfileType::User`].
    pub fn seed_types(&self) -> &[ProfileType] {
        &self.seed_types
    }

    /// Authenticates the request. The caller proceeds with the request only on `Ok`.
    pub async fn handle(
        &self,
        context: &dyn WebContext,
        attributes: &RequestAttributes,
    ) -> Result<Arc<UserProfile>, AuthError> {
        let names = context
            .request_parameter(self.clients.client_name_parameter())
            .unwrap_or(self.name.as_str());

        let mut candidates = self
            .finder
            .find(&self.clients, context, names)
            .into_iter()
            .filter(|client| self.client_kinds.contains(&client.kind()));

        let Some(client) = candidates.next() else {
            log::debug!("No configured client matches '{names}'");
            return Err(AuthError::NoClient(names.to_string()));
        };

        if candidates.next().is_some() {
            log::debug!("Several clients match '{names}', using {}", client.name());
        }

        if let Some(id) = attributes.get(AUTH_ID) {
            match self.store.get(&id).await? {
                Some(profile) => {
                    log::debug!("Restored profile '{id}' from the session");
                    self.seed(attributes, &profile);

                    return Ok(profile);
                }
                None => log::debug!("Session profile '{id}' is no longer stored"),
            }
        }

        let credentials = client.credentials(context)?;

        let Some(profile) = client.user_profile(&credentials, context).await? else {
            log::debug!("Client {} resolved no profile", client.name());
            return Err(AuthError::NoProfile(client.name().to_string()));
        };

        let profile = Arc::new(profile);
        log::debug!("Client {} authenticated profile '{}'", client.name(), profile.id());

        self.store.set(profile.clone()).await?;
        attributes.set(AUTH_ID, profile.id());
        self.seed(attributes, &profile);

        Ok(profile)
    }

    fn seed(&self, attributes: &RequestAttributes, profile: &Arc<UserProfile>) {
        let own = profile.profile_type();

        for profile_type in seed_types(std::iter::once(own).chain(self.seed_types.iter().copied())) {
            attributes.set_profile(profile_type, profile.clone());
        }
    }
}

/// Concatenates the lineages of the given types without repetition, ending with the user type.
fn seed_types(types: impl IntoIterator<Item = ProfileType>) -> Vec<ProfileType> {
    let mut seeds = Vec::new();

    for profile_type in types.into_iter().flat_map(ProfileType::lineage) {
        if *profile_type != ProfileType::User && !seeds.contains(profile_type) {
            seeds.push(*profile_type);
        }
    }

    seeds.push(ProfileType::User);
    seeds
}
