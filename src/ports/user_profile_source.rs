//! UserProfileSource port - behavioral profiles by user id.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::UserId;
use crate::domain::trip::UserProfile;

#[derive(Debug, Error)]
pub enum ProfileSourceError {
    #[error("Profile source unavailable: {0}")]
    Unavailable(String),

    #[error("Profile for {user_id} is unreadable: {reason}")]
    Corrupt { user_id: String, reason: String },
}

/// Read-only access to traveler profiles.
///
/// An unknown user is `Ok(None)`, not an error; the pipeline runs without a
/// profile in that case.
#[async_trait]
pub trait UserProfileSource: Send + Sync {
    async fn get_user_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, ProfileSourceError>;
}
