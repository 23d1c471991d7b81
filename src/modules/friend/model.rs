use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::modules::{
    friend::schema::{FriendRequestEntity, FriendshipEntity},
    user::schema::{ProfileVisibility, UserEntity},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl From<UserEntity> for UserSummary {
    fn from(user: UserEntity) -> Self {
        UserSummary {
            id: user.id,
            username: user.username,
            display_name: user.display_name,
            avatar_url: user.avatar_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FriendResponse {
    pub friendship_id: Uuid,
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub since: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdOrInfo {
    Id(String),
    Info(UserSummary),
}

#[derive(sqlx::FromRow)]
pub struct FriendUserRow {
    pub req_id: Uuid,
    pub user_id: String,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub message: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl FriendUserRow {
    pub fn counterpart(&self) -> UserSummary {
        UserSummary {
            id: self.user_id.clone(),
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestResponse {
    pub id: Uuid,
    pub from: IdOrInfo,
    pub to: IdOrInfo,
    pub message: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestBody {
    #[validate(length(min = 1, message = "Recipient id cannot be empty"))]
    pub recipient_id: String,
    #[validate(length(max = 500, message = "Message must be at most 500 characters long"))]
    pub message: Option<String>,
}

/// Insert payload for a pending request; the message is already normalized.
pub struct NewFriendRequest {
    pub id: Uuid,
    pub from_user_id: String,
    pub to_user_id: String,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RespondAction {
    Accept,
    Decline,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum RespondOutcome {
    Accepted { friendship: FriendshipEntity },
    Declined { request: FriendRequestEntity },
}

impl RespondOutcome {
    pub fn tag(&self) -> &'static str {
        match self {
            RespondOutcome::Accepted { .. } => "accepted",
            RespondOutcome::Declined { .. } => "declined",
        }
    }
}

/// How the viewer relates to the subject, resolved in precedence order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum RelationshipStatus {
    #[serde(rename = "self")]
    Myself,
    #[serde(rename = "userNotFound")]
    UserNotFound,
    #[serde(rename = "friends", rename_all = "camelCase")]
    Friends { friendship_id: Uuid },
    #[serde(rename = "requestSent", rename_all = "camelCase")]
    RequestSent { request_id: Uuid },
    #[serde(rename = "requestReceived", rename_all = "camelCase")]
    RequestReceived { request_id: Uuid },
    #[serde(rename = "notAccepting")]
    NotAccepting,
    #[serde(rename = "none")]
    NoRelation,
}

impl RelationshipStatus {
    pub fn is_friends(&self) -> bool {
        matches!(self, RelationshipStatus::Friends { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileAccessResponse {
    pub user_id: String,
    pub visibility: ProfileVisibility,
    pub can_view: bool,
    pub relationship: RelationshipStatus,
}
