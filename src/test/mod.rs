use std::sync::Arc;

use uuid::Uuid;

use crate::{
    constants::Env,
    modules::{
        friend::{
            model::NewFriendRequest,
            repository::{FriendRepo, FriendRequestRepository},
            repository_memory::FriendRepositoryMemory,
            service::FriendService,
        },
        user::{
            model::UpdatePreferences, repository::UserRepository,
            repository_memory::UserRepositoryMemory, schema::ProfileVisibility,
            service::UserService,
        },
    },
    utils::Claims,
};

pub const TEST_SECRET: &str = "test-secret";

pub struct TestContext {
    pub users: Arc<UserRepositoryMemory>,
    pub friends: Arc<FriendRepositoryMemory>,
    pub friend_service: FriendService,
    pub user_service: UserService,
}

impl TestContext {
    pub fn new() -> Self {
        let users = Arc::new(UserRepositoryMemory::new());
        let friends = Arc::new(FriendRepositoryMemory::new(users.clone()));
        Self::assemble(users, friends)
    }

    pub fn with_stale_reads() -> Self {
        let users = Arc::new(UserRepositoryMemory::new());
        let friends = Arc::new(FriendRepositoryMemory::new(users.clone()).with_stale_reads());
        Self::assemble(users, friends)
    }

    fn assemble(users: Arc<UserRepositoryMemory>, friends: Arc<FriendRepositoryMemory>) -> Self {
        let friend_service = FriendService::with_dependencies(friends.clone(), users.clone());
        let user_service = UserService::with_dependencies(users.clone());
        TestContext { users, friends, friend_service, user_service }
    }

    pub fn add_user(&self, id: &str, allow_friend_requests: bool) {
        self.users.insert(id, allow_friend_requests, ProfileVisibility::Public);
    }

    pub fn add_user_with_visibility(&self, id: &str, visibility: ProfileVisibility) {
        self.users.insert(id, true, visibility);
    }

    pub async fn set_allow_requests(&self, id: &str, allow: bool) {
        let update = UpdatePreferences { allow_friend_requests: Some(allow), profile_visibility: None };
        self.users.update_preferences(id, &update).await.unwrap();
    }

    /// Makes the two users friends straight through the store, bypassing preference checks.
    pub async fn befriend(&self, from: &str, to: &str) -> Uuid {
        let request = self
            .friends
            .create_friend_request(&NewFriendRequest {
                id: Uuid::now_v7(),
                from_user_id: from.to_string(),
                to_user_id: to.to_string(),
                message: None,
            })
            .await
            .unwrap();

        self.friends.accept_friend_request_atomic(&request.id, to).await.unwrap().unwrap().id
    }
}

pub fn test_env() -> Env {
    Env {
        jwt_secret: TEST_SECRET.to_string(),
        database_url: "postgres://localhost/unused".to_string(),
        database_max_connections: 1,
        frontend_url: "http://localhost:5173".to_string(),
        ip: "127.0.0.1".to_string(),
        port: 0,
    }
}

pub fn bearer(user_id: &str) -> String {
    let token = Claims::new(user_id, 3600).encode(TEST_SECRET.as_bytes()).unwrap();
    format!("Bearer {token}")
}

/// Builds the `/api` application over the context's in-memory services.
macro_rules! test_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($crate::test::test_env()))
                .app_data(actix_web::web::Data::new($ctx.friend_service.clone()))
                .app_data(actix_web::web::Data::new($ctx.user_service.clone()))
                .configure($crate::modules::configure),
        )
        .await
    };
}

pub(crate) use test_app;
