//! In-memory profile store using the mini-moka crate.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use config::ProfileStoreConfig;
use mini_moka::sync::Cache;

use super::ProfileStore;
use crate::{StoreError, UserProfile};

/// Bounded in-memory profile store. Profiles not read within the idle timeout are evicted.
pub struct InMemoryProfileStore {
    profiles: Cache<String, Arc<UserProfile>>,
}

impl InMemoryProfileStore {
    /// Create a store holding at most `max_size` profiles.
    pub fn new(max_size: u64, idle_timeout: Duration) -> Self {
        let profiles = Cache::builder()
            .max_capacity(max_size)
            .time_to_idle(idle_timeout)
            .build();

        Self { profiles }
    }

    /// Create a store from the `[auth.store]` section.
    pub fn from_config(config: &ProfileStoreConfig) -> Self {
        Self::new(config.max_size, config.idle_timeout)
    }
}

impl Default for InMemoryProfileStore {
    fn default() -> Self {
        Self::from_config(&ProfileStoreConfig::default())
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get(&self, id: &str) -> Result<Option<Arc<UserProfile>>, StoreError> {
        Ok(self.profiles.get(&id.to_string()))
    }

    async fn set(&self, profile: Arc<UserProfile>) -> Result<(), StoreError> {
        log::debug!("Storing profile '{}'", profile.id());
        self.profiles.insert(profile.id().to_string(), profile);

        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), StoreError> {
        log::debug!("Removing profile '{id}'");
        self.profiles.invalidate(&id.to_string());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProfileType;

    #[tokio::test]
    async fn set_get_remove() {
        let store = InMemoryProfileStore::default();
        let profile = Arc::new(UserProfile::new("123", ProfileType::Http));

        assert!(store.get("123").await.unwrap().is_none());

        store.set(profile.clone()).await.unwrap();
        assert_eq!(store.get("123").await.unwrap(), Some(profile));

        store.remove("123").await.unwrap();
        assert!(store.get("123").await.unwrap().is_none());

        store.remove("unknown").await.unwrap();
    }

    #[tokio::test]
    async fn set_replaces_previous_profile() {
        let store = InMemoryProfileStore::default();

        store
            .set(Arc::new(UserProfile::new("123", ProfileType::Common)))
            .await
            .unwrap();

        store
            .set(Arc::new(UserProfile::new("123", ProfileType::Http)))
            .await
            .unwrap();

        let profile = store.get("123").await.unwrap().unwrap();
        assert_eq!(profile.profile_type(), ProfileType::Http);
    }

    #[tokio::test]
    async fn idle_profiles_expire() {
        let store = InMemoryProfileStore::new(10, Duration::from_millis(50));

        store
            .set(Arc::new(UserProfile::new("123", ProfileType::Http)))
            .await
            .unwrap();

        std::thread::sleep(Duration::from_millis(200));

        assert!(store.get("123").await.unwrap().is_none());
    }
}
