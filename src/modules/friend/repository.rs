use uuid::Uuid;

use crate::api::error;
use crate::modules::friend::model::{FriendRequestResponse, FriendResponse, NewFriendRequest};
use crate::modules::friend::schema::{FriendRequestEntity, FriendshipEntity};

#[async_trait::async_trait]
pub trait FriendRepository: Send + Sync {
    /// Symmetric lookup: argument order does not matter.
    async fn find_friendship(
        &self,
        user_id_a: &str,
        user_id_b: &str,
    ) -> Result<Option<FriendshipEntity>, error::SystemError>;

    async fn find_friends(&self, user_id: &str)
    -> Result<Vec<FriendResponse>, error::SystemError>;

    /// Deletes the friendship only when `user_id` is one of its members.
    async fn delete_friendship(
        &self,
        friendship_id: &Uuid,
        user_id: &str,
    ) -> Result<bool, error::SystemError>;
}

#[async_trait::async_trait]
pub trait FriendRequestRepository: Send + Sync {
    /// The pending request between the two users, whichever direction it goes.
    async fn find_pending_request(
        &self,
        user_id_a: &str,
        user_id_b: &str,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError>;

    async fn find_friend_request_from_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError>;

    async fn find_friend_request_to_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError>;

    /// Inserts a pending request. Fails with a conflict on
    /// `friendships_pair_key` when the users are already friends and on
    /// `friend_requests_pending_pair_key` when a pending request exists.
    async fn create_friend_request(
        &self,
        request: &NewFriendRequest,
    ) -> Result<FriendRequestEntity, error::SystemError>;

    /// Marks a pending request addressed to `recipient_id` as declined.
    async fn decline_friend_request(
        &self,
        request_id: &Uuid,
        recipient_id: &str,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError>;

    /// Deletes a pending request sent by `sender_id`.
    async fn cancel_friend_request(
        &self,
        request_id: &Uuid,
        sender_id: &str,
    ) -> Result<bool, error::SystemError>;
}

#[async_trait::async_trait]
pub trait FriendRepo: FriendRepository + FriendRequestRepository {
    /// Creates the friendship and marks the request accepted in one transaction.
    /// Returns `None` when no pending request with that id is addressed to `recipient_id`.
    async fn accept_friend_request_atomic(
        &self,
        request_id: &Uuid,
        recipient_id: &str,
    ) -> Result<Option<FriendshipEntity>, error::SystemError>;
}
