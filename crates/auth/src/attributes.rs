use std::{
    collections::BTreeMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use dashmap::DashMap;

use crate::{ProfileType, UserProfile};

/// Request-scoped attributes shared between the layers handling one request.
///
/// String attributes are what a session persists; profiles are seeded per request under
/// their type keys. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct RequestAttributes(Arc<Inner>);

#[derive(Debug, Default)]
struct Inner {
    values: DashMap<String, String>,
    profiles: DashMap<ProfileType, Arc<UserProfile>>,
    modified: AtomicBool,
}

impl RequestAttributes {
    /// Attributes restored from a previous request, not marked as modified.
    pub fn from_values(values: impl IntoIterator<Item = (String, String)>) -> Self {
        let attributes = Self::default();

        for (name, value) in values {
            attributes.0.values.insert(name, value);
        }

        attributes
    }

    /// Reads a string attribute.
    pub fn get(&self, name: &str) -> Option<String> {
        self.0.values.get(name).map(|value| value.clone())
    }

    /// Sets a string attribute.
    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) {
        self.0.values.insert(name.into(), value.into());
        self.0.modified.store(true, Ordering::Release);
    }

    /// Removes a string attribute, returning its value.
    pub fn remove(&self, name: &str) -> Option<String> {
        let removed = self.0.values.remove(name).map(|(_, value)| value);

        if removed.is_some() {
            self.0.modified.store(true, Ordering::Release);
        }

        removed
    }

    /// Whether a string attribute changed since the attributes were created.
    pub fn is_modified(&self) -> bool {
        self.0.modified.load(Ordering::Acquire)
    }

    /// A snapshot of the string attributes.
    pub fn values(&self) -> BTreeMap<String, String> {
        self.0
            .values
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Seeds a profile under a type key.
    pub fn set_profile(&self, profile_type: ProfileType, profile: Arc<UserProfile>) {
        self.0.profiles.insert(profile_type, profile);
    }

    /// The profile seeded under a type key.
    pub fn profile(&self, profile_type: ProfileType) -> Option<Arc<UserProfile>> {
        self.0.profiles.get(&profile_type).map(|profile| profile.clone())
    }

    /// The type keys a profile is seeded under.
    pub fn profile_types(&self) -> Vec<ProfileType> {
        let mut types: Vec<_> = self.0.profiles.iter().map(|entry| *entry.key()).collect();
        types.sort();
        types
    }
}
