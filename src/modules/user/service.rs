use std::sync::Arc;

use crate::api::error;
use crate::modules::user::model::{PreferencesResponse, UpdatePreferences, UpdatePreferencesModel};
use crate::modules::user::repository::UserRepository;

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn with_dependencies(repo: Arc<dyn UserRepository>) -> Self {
        tracing::info!("UserService initialized with dependencies");
        UserService { repo }
    }

    pub async fn get_preferences(&self, id: &str) -> Result<PreferencesResponse, error::SystemError> {
        let user = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        Ok(PreferencesResponse::from(user))
    }

    pub async fn update_preferences(
        &self,
        id: &str,
        preferences: UpdatePreferencesModel,
    ) -> Result<PreferencesResponse, error::SystemError> {
        if preferences.allow_friend_requests.is_none() && preferences.profile_visibility.is_none() {
            return Err(error::SystemError::bad_request("No fields to update"));
        }

        let update = UpdatePreferences {
            allow_friend_requests: preferences.allow_friend_requests,
            profile_visibility: preferences.profile_visibility,
        };

        let user = self
            .repo
            .update_preferences(id, &update)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        tracing::info!(
            "User {} preferences updated: allow_friend_requests={}, visibility={:?}",
            id,
            user.allow_friend_requests,
            user.profile_visibility
        );

        Ok(PreferencesResponse::from(user))
    }
}
