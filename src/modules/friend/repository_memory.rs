use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        friend::{
            model::{FriendRequestResponse, FriendResponse, IdOrInfo, NewFriendRequest, UserSummary},
            repository::{FriendRepo, FriendRepository, FriendRequestRepository},
            schema::{
                canonical_pair, FriendRequestEntity, FriendRequestStatus, FriendshipEntity,
                FRIENDSHIP_PAIR_KEY, PENDING_REQUEST_PAIR_KEY,
            },
        },
        user::repository_memory::UserRepositoryMemory,
    },
};

#[derive(Default)]
struct MemoryState {
    friendships: Vec<FriendshipEntity>,
    requests: Vec<FriendRequestEntity>,
}

impl MemoryState {
    fn friendship_between(&self, a: &str, b: &str) -> Option<&FriendshipEntity> {
        let key = canonical_pair(a, b);
        self.friendships.iter().find(|f| canonical_pair(&f.user_a, &f.user_b) == key)
    }

    fn pending_between(&self, a: &str, b: &str) -> Option<&FriendRequestEntity> {
        let key = canonical_pair(a, b);
        self.requests.iter().find(|r| {
            r.status == FriendRequestStatus::Pending
                && canonical_pair(&r.from_user_id, &r.to_user_id) == key
        })
    }
}

/// Relationship store held behind one mutex, so every write is a single
/// critical section exactly like a serialized transaction.
pub struct FriendRepositoryMemory {
    state: Mutex<MemoryState>,
    users: Arc<UserRepositoryMemory>,
    stale_reads: bool,
}

impl FriendRepositoryMemory {
    pub fn new(users: Arc<UserRepositoryMemory>) -> Self {
        Self { state: Mutex::default(), users, stale_reads: false }
    }

    /// Plain lookups report nothing, as a reader racing a concurrent writer would.
    /// Writes still see and enforce the real state.
    pub fn with_stale_reads(mut self) -> Self {
        self.stale_reads = true;
        self
    }

    pub fn friendships(&self) -> Vec<FriendshipEntity> {
        self.state.lock().expect("friend store poisoned").friendships.clone()
    }

    pub fn requests(&self) -> Vec<FriendRequestEntity> {
        self.state.lock().expect("friend store poisoned").requests.clone()
    }

    fn summary(&self, user_id: &str) -> Option<UserSummary> {
        self.users.get(user_id).map(UserSummary::from)
    }
}

#[async_trait::async_trait]
impl FriendRepository for FriendRepositoryMemory {
    async fn find_friendship(
        &self,
        user_id_a: &str,
        user_id_b: &str,
    ) -> Result<Option<FriendshipEntity>, error::SystemError> {
        if self.stale_reads {
            return Ok(None);
        }
        let state = self.state.lock().expect("friend store poisoned");
        Ok(state.friendship_between(user_id_a, user_id_b).cloned())
    }

    async fn find_friends(&self, user_id: &str) -> Result<Vec<FriendResponse>, error::SystemError> {
        let mut friendships: Vec<FriendshipEntity> =
            self.friendships().into_iter().filter(|f| f.involves(user_id)).collect();
        friendships.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        Ok(friendships
            .into_iter()
            .filter_map(|f| {
                let other = if f.user_a == user_id { &f.user_b } else { &f.user_a };
                self.summary(other).map(|u| FriendResponse {
                    friendship_id: f.id,
                    id: u.id,
                    username: u.username,
                    display_name: u.display_name,
                    avatar_url: u.avatar_url,
                    since: f.created_at,
                })
            })
            .collect())
    }

    async fn delete_friendship(
        &self,
        friendship_id: &Uuid,
        user_id: &str,
    ) -> Result<bool, error::SystemError> {
        let mut state = self.state.lock().expect("friend store poisoned");
        let before = state.friendships.len();
        state.friendships.retain(|f| !(f.id == *friendship_id && f.involves(user_id)));
        Ok(state.friendships.len() < before)
    }
}

#[async_trait::async_trait]
impl FriendRequestRepository for FriendRepositoryMemory {
    async fn find_pending_request(
        &self,
        user_id_a: &str,
        user_id_b: &str,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        if self.stale_reads {
            return Ok(None);
        }
        let state = self.state.lock().expect("friend store poisoned");
        Ok(state.pending_between(user_id_a, user_id_b).cloned())
    }

    async fn find_friend_request_from_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError> {
        let mut requests: Vec<FriendRequestEntity> = self
            .requests()
            .into_iter()
            .filter(|r| r.from_user_id == user_id && r.status == FriendRequestStatus::Pending)
            .collect();
        requests.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        Ok(requests
            .into_iter()
            .filter_map(|r| {
                self.summary(&r.to_user_id).map(|to| FriendRequestResponse {
                    id: r.id,
                    from: IdOrInfo::Id(r.from_user_id),
                    to: IdOrInfo::Info(to),
                    message: r.message,
                    created_at: r.created_at,
                })
            })
            .collect())
    }

    async fn find_friend_request_to_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError> {
        let mut requests: Vec<FriendRequestEntity> = self
            .requests()
            .into_iter()
            .filter(|r| r.to_user_id == user_id && r.status == FriendRequestStatus::Pending)
            .collect();
        requests.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        Ok(requests
            .into_iter()
            .filter_map(|r| {
                self.summary(&r.from_user_id).map(|from| FriendRequestResponse {
                    id: r.id,
                    from: IdOrInfo::Info(from),
                    to: IdOrInfo::Id(r.to_user_id),
                    message: r.message,
                    created_at: r.created_at,
                })
            })
            .collect())
    }

    async fn create_friend_request(
        &self,
        request: &NewFriendRequest,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let mut state = self.state.lock().expect("friend store poisoned");

        if state.friendship_between(&request.from_user_id, &request.to_user_id).is_some() {
            return Err(error::SystemError::conflict_on(FRIENDSHIP_PAIR_KEY));
        }
        if state.pending_between(&request.from_user_id, &request.to_user_id).is_some() {
            return Err(error::SystemError::conflict_on(PENDING_REQUEST_PAIR_KEY));
        }

        let now = chrono::Utc::now();
        let created = FriendRequestEntity {
            id: request.id,
            from_user_id: request.from_user_id.clone(),
            to_user_id: request.to_user_id.clone(),
            status: FriendRequestStatus::Pending,
            message: request.message.clone(),
            created_at: now,
            updated_at: now,
        };
        state.requests.push(created.clone());

        Ok(created)
    }

    async fn decline_friend_request(
        &self,
        request_id: &Uuid,
        recipient_id: &str,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let mut state = self.state.lock().expect("friend store poisoned");

        let Some(request) = state.requests.iter_mut().find(|r| {
            r.id == *request_id
                && r.to_user_id == recipient_id
                && r.status == FriendRequestStatus::Pending
        }) else {
            return Ok(None);
        };

        request.status = FriendRequestStatus::Declined;
        request.updated_at = chrono::Utc::now();

        Ok(Some(request.clone()))
    }

    async fn cancel_friend_request(
        &self,
        request_id: &Uuid,
        sender_id: &str,
    ) -> Result<bool, error::SystemError> {
        let mut state = self.state.lock().expect("friend store poisoned");
        let before = state.requests.len();
        state.requests.retain(|r| {
            !(r.id == *request_id
                && r.from_user_id == sender_id
                && r.status == FriendRequestStatus::Pending)
        });
        Ok(state.requests.len() < before)
    }
}

#[async_trait::async_trait]
impl FriendRepo for FriendRepositoryMemory {
    async fn accept_friend_request_atomic(
        &self,
        request_id: &Uuid,
        recipient_id: &str,
    ) -> Result<Option<FriendshipEntity>, error::SystemError> {
        let mut state = self.state.lock().expect("friend store poisoned");

        let Some(index) = state.requests.iter().position(|r| {
            r.id == *request_id
                && r.to_user_id == recipient_id
                && r.status == FriendRequestStatus::Pending
        }) else {
            return Ok(None);
        };

        let (from_user_id, to_user_id) = {
            let request = &state.requests[index];
            (request.from_user_id.clone(), request.to_user_id.clone())
        };

        if state.friendship_between(&from_user_id, &to_user_id).is_some() {
            return Err(error::SystemError::conflict_on(FRIENDSHIP_PAIR_KEY));
        }

        let now = chrono::Utc::now();
        let friendship = FriendshipEntity {
            id: Uuid::now_v7(),
            user_a: from_user_id,
            user_b: to_user_id,
            created_at: now,
        };

        // Both halves land under the same guard, so neither is visible alone.
        state.friendships.push(friendship.clone());
        let request = &mut state.requests[index];
        request.status = FriendRequestStatus::Accepted;
        request.updated_at = now;

        Ok(Some(friendship))
    }
}
