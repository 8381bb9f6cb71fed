//! Filesystem profile source reading JSON files.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::foundation::UserId;
use crate::domain::trip::UserProfile;
use crate::ports::{ProfileSourceError, UserProfileSource};

/// Reads profiles from `{base_dir}/profiles/{user_id}.json`.
#[derive(Debug, Clone)]
pub struct FsProfileSource {
    base_dir: PathBuf,
}

impl FsProfileSource {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    fn profiles_dir(&self) -> PathBuf {
        self.base_dir.join("profiles")
    }

    fn file_path(&self, user_id: &UserId) -> PathBuf {
        self.profiles_dir().join(format!("{}.json", user_id.as_str()))
    }

    /// Writes a profile, replacing any existing file atomically.
    pub async fn save(&self, profile: &UserProfile) -> Result<PathBuf, ProfileSourceError> {
        profile.validate().map_err(|e| ProfileSourceError::Corrupt {
            user_id: profile.user_id.to_string(),
            reason: e.to_string(),
        })?;

        fs::create_dir_all(self.profiles_dir())
            .await
            .map_err(|e| ProfileSourceError::Unavailable(format!("Failed to create directory: {}", e)))?;

        let file_path = self.file_path(&profile.user_id);
        let content = serde_json::to_vec_pretty(profile).map_err(|e| ProfileSourceError::Corrupt {
            user_id: profile.user_id.to_string(),
            reason: e.to_string(),
        })?;

        let temp_path = file_path.with_extension("tmp");
        fs::write(&temp_path, content)
            .await
            .map_err(|e| ProfileSourceError::Unavailable(format!("Failed to write temporary file: {}", e)))?;
        fs::rename(&temp_path, &file_path)
            .await
            .map_err(|e| ProfileSourceError::Unavailable(format!("Failed to rename file: {}", e)))?;

        Ok(file_path)
    }
}

#[async_trait]
impl UserProfileSource for FsProfileSource {
    async fn get_user_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, ProfileSourceError> {
        let file_path = self.file_path(user_id);

        let content = match fs::read(&file_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ProfileSourceError::Unavailable(format!(
                    "Failed to read {}: {}",
                    file_path.display(),
                    e
                )))
            }
        };

        let corrupt = |reason: String| ProfileSourceError::Corrupt {
            user_id: user_id.to_string(),
            reason,
        };
        let profile: UserProfile = serde_json::from_slice(&content).map_err(|e| corrupt(e.to_string()))?;
        profile.validate().map_err(|e| corrupt(e.to_string()))?;
        if &profile.user_id != user_id {
            return Err(corrupt(format!("file belongs to {}", profile.user_id)));
        }

        Ok(Some(profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    #[tokio::test]
    async fn save_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let source = FsProfileSource::new(temp_dir.path());
        let mut profile = UserProfile::neutral(user("budi"));
        profile.price_sensitivity = 0.8;

        let path = source.save(&profile).await.unwrap();
        assert!(path.ends_with("profiles/budi.json"));

        let loaded = source.get_user_profile(&user("budi")).await.unwrap();
        assert_eq!(loaded, Some(profile));
    }

    #[tokio::test]
    async fn missing_file_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let source = FsProfileSource::new(temp_dir.path());
        assert!(source.get_user_profile(&user("ghost")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_json_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("profiles");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("broken.json"), "{ not json").unwrap();

        let source = FsProfileSource::new(temp_dir.path());
        let result = source.get_user_profile(&user("broken")).await;
        assert!(matches!(result, Err(ProfileSourceError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn out_of_range_scores_are_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("profiles");
        std::fs::create_dir_all(&dir).unwrap();
        let mut profile = UserProfile::neutral(user("wild"));
        profile.risk_tolerance = 1.5;
        std::fs::write(dir.join("wild.json"), serde_json::to_vec(&profile).unwrap()).unwrap();

        let source = FsProfileSource::new(temp_dir.path());
        assert!(matches!(
            source.get_user_profile(&user("wild")).await,
            Err(ProfileSourceError::Corrupt { .. })
        ));
        assert!(source.save(&profile).await.is_err());
    }

    #[tokio::test]
    async fn stored_traversal_user_id_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("profiles");
        std::fs::create_dir_all(&dir).unwrap();
        let mut json = serde_json::to_value(UserProfile::neutral(user("sly"))).unwrap();
        json["user_id"] = serde_json::Value::String("../../etc/passwd".to_string());
        std::fs::write(dir.join("sly.json"), serde_json::to_vec(&json).unwrap()).unwrap();

        let source = FsProfileSource::new(temp_dir.path());
        assert!(matches!(
            source.get_user_profile(&user("sly")).await,
            Err(ProfileSourceError::Corrupt { .. })
        ));
        assert!(!temp_dir.path().join("etc").exists());
    }
}
