use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The declared profile types.
///
/// A profile of a given type also satisfies every type of its [lineage](ProfileType::lineage),
/// which is how one profile ends up seeded under several request attribute keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileType {
    /// The generic profile every profile satisfies.
    User,
    /// Profile carrying the common identity attributes.
    Common,
    /// Profile resolved by one of the HTTP clients.
    Http,
}

impl ProfileType {
    /// The name used for diagnostics and attribute keys.
    pub fn simple_name(self) -> &'static str {
        match self {
            ProfileType::User => "UserProfile",
            ProfileType::Common => "CommonProfile",
            ProfileType::Http => "HttpProfile",
        }
    }

    /// The type itself followed by all of its supertypes, ending with [`ProfileType::User`].
    pub fn lineage(self) -> &'static [ProfileType] {
        match self {
            ProfileType::User => &[ProfileType::User],
            ProfileType::Common => &[ProfileType::Common, ProfileType::User],
            ProfileType::Http => &[ProfileType::Http, ProfileType::Common, ProfileType::User],
        }
    }
}

/// The resolved identity of an authenticated principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    id: String,
    profile_type: ProfileType,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_name: Option<String>,
    attributes: BTreeMap<String, Value>,
}

impl UserProfile {
    /// Creates a profile without attributes.
    pub fn new(id: impl Into<String>, profile_type: ProfileType) -> Self {
        Self {
            id: id.into(),
            profile_type,
            client_name: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Adds an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Records the client the profile was resolved by.
    pub fn with_client_name(mut self, client_name: impl Into<String>) -> Self {
        self.client_name = Some(client_name.into());
        self
    }

    /// Changes the runtime type of the profile.
    pub fn with_profile_type(mut self, profile_type: ProfileType) -> Self {
        self.profile_type = profile_type;
        self
    }

    /// The profile identifier, also used as the session identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The runtime type of the profile.
    pub fn profile_type(&self) -> ProfileType {
        self.profile_type
    }

    /// The client that resolved the profile.
    pub fn client_name(&self) -> Option<&str> {
        self.client_name.as_deref()
    }

    /// Looks up an attribute.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// All attributes.
    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }
}
