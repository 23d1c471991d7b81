use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use crate::{
    api::error,
    modules::user::{
        model::UpdatePreferences,
        repository::UserRepository,
        schema::{ProfileVisibility, UserEntity},
    },
};

/// In-process identity store used by the service and HTTP tests.
#[derive(Default)]
pub struct UserRepositoryMemory {
    users: Mutex<HashMap<String, UserEntity>>,
    lookups: AtomicUsize,
}

impl UserRepositoryMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: &str, allow_friend_requests: bool, visibility: ProfileVisibility) {
        let now = chrono::Utc::now();
        let user = UserEntity {
            id: id.to_string(),
            username: id.to_string(),
            display_name: format!("Display {id}"),
            avatar_url: None,
            allow_friend_requests,
            profile_visibility: visibility,
            created_at: now,
            updated_at: now,
        };
        self.users.lock().expect("user store poisoned").insert(id.to_string(), user);
    }

    pub fn get(&self, id: &str) -> Option<UserEntity> {
        self.users.lock().expect("user store poisoned").get(id).cloned()
    }

    /// Number of `find_by_id` calls served so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl UserRepository for UserRepositoryMemory {
    async fn find_by_id(&self, id: &str) -> Result<Option<UserEntity>, error::SystemError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.get(id))
    }

    async fn update_preferences(
        &self,
        id: &str,
        preferences: &UpdatePreferences,
    ) -> Result<Option<UserEntity>, error::SystemError> {
        let mut users = self.users.lock().expect("user store poisoned");
        let Some(user) = users.get_mut(id) else {
            return Ok(None);
        };

        if let Some(allow) = preferences.allow_friend_requests {
            user.allow_friend_requests = allow;
        }
        if let Some(visibility) = preferences.profile_visibility {
            user.profile_visibility = visibility;
        }
        user.updated_at = chrono::Utc::now();

        Ok(Some(user.clone()))
    }
}
