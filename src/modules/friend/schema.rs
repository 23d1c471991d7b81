use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

/// Unique index over the canonical pair of a friendship.
pub const FRIENDSHIP_PAIR_KEY: &str = "friendships_pair_key";
/// Partial unique index over the canonical pair of pending requests.
pub const PENDING_REQUEST_PAIR_KEY: &str = "friend_requests_pending_pair_key";

#[derive(Debug, PartialEq, Eq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "friend_request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FriendRequestStatus {
    Pending,
    Accepted,
    Declined,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FriendshipEntity {
    pub id: Uuid,
    pub user_a: String,
    pub user_b: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl FriendshipEntity {
    pub fn involves(&self, user_id: &str) -> bool {
        self.user_a == user_id || self.user_b == user_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestEntity {
    pub id: Uuid,
    pub from_user_id: String,
    pub to_user_id: String,
    pub status: FriendRequestStatus,
    pub message: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Orders two user ids so the same unordered pair always yields the same key.
/// Bytewise, matching the `C` collation of the id columns.
pub fn canonical_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
