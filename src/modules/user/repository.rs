use crate::{
    api::error,
    modules::user::{model::UpdatePreferences, schema::UserEntity},
};

/// Read side of the identity provider plus the two relationship-facing preference flags.
#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<UserEntity>, error::SystemError>;

    async fn update_preferences(
        &self,
        id: &str,
        preferences: &UpdatePreferences,
    ) -> Result<Option<UserEntity>, error::SystemError>;
}
