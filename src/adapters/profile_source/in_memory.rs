//! In-memory profile source backed by a HashMap.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::UserId;
use crate::domain::trip::UserProfile;
use crate::ports::{ProfileSourceError, UserProfileSource};

#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileSource {
    profiles: Arc<RwLock<HashMap<UserId, UserProfile>>>,
}

impl InMemoryProfileSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the source with the given profiles, keyed by their user id.
    pub fn with_profiles(profiles: impl IntoIterator<Item = UserProfile>) -> Self {
        let map = profiles
            .into_iter()
            .map(|p| (p.user_id.clone(), p))
            .collect();
        Self {
            profiles: Arc::new(RwLock::new(map)),
        }
    }

    pub async fn insert(&self, profile: UserProfile) {
        self.profiles
            .write()
            .await
            .insert(profile.user_id.clone(), profile);
    }

    pub async fn len(&self) -> usize {
        self.profiles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.profiles.read().await.is_empty()
    }
}

#[async_trait]
impl UserProfileSource for InMemoryProfileSource {
    async fn get_user_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, ProfileSourceError> {
        Ok(self.profiles.read().await.get(user_id).cloned())
    }
}
