//! Persistence of resolved profiles between requests.

mod memory;

use std::sync::Arc;

use async_trait::async_trait;

pub use memory::InMemoryProfileStore;

use crate::{StoreError, UserProfile};

/// Backend keeping profiles by their identifier.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Reads a profile. A missing or expired profile is `Ok(None)`.
    async fn get(&self, id: &str) -> Result<Option<Arc<UserProfile>>, StoreError>;

    /// Stores a profile under its identifier, replacing any previous one.
    async fn set(&self, profile: Arc<UserProfile>) -> Result<(), StoreError>;

    /// Removes a profile. Removing an unknown identifier is not an error.
    async fn remove(&self, id: &str) -> Result<(), StoreError>;
}
